use comfy_table::{Cell, Color, Table};
use sim::allocator::Allocation;
use sim::paging::PagingTrace;
use sim::scheduler::Schedule;

fn dash() -> Cell {
    Cell::new("-")
}

pub fn allocation_report(allocation: &Allocation) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Process"),
        Cell::new("Size"),
        Cell::new("Block #"),
        Cell::new("Block Size"),
        Cell::new("Internal Fragmentation"),
    ]);

    for placement in allocation.placements() {
        let mut row = vec![Cell::new(placement.process), Cell::new(placement.size)];
        match (placement.block, placement.block_size, placement.fragmentation) {
            (Some(block), Some(block_size), Some(fragmentation)) => {
                row.push(Cell::new(block));
                row.push(Cell::new(block_size));
                row.push(Cell::new(fragmentation));
            }
            _ => row.extend([dash(), dash(), dash()]),
        }
        table.add_row(row);
    }

    let free_blocks = allocation.free_blocks();
    let free = if free_blocks.is_empty() {
        "none".to_string()
    } else {
        free_blocks
            .iter()
            .map(|&block| format!("{block}:{}", allocation.blocks()[block]))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{table}\nTotal internal fragmentation: {}\nFree blocks (index:size): {free}",
        allocation.total_fragmentation()
    )
}

pub fn paging_report(trace: &PagingTrace) -> String {
    let mut table = Table::new();
    let mut header = vec![Cell::new("Step"), Cell::new("Page")];
    header.extend((0..trace.frame_count()).map(|frame| Cell::new(format!("F{frame}"))));
    header.push(Cell::new("Status"));
    header.push(Cell::new("Replaced"));
    table.set_header(header);

    for record in trace.steps() {
        let mut row = vec![Cell::new(record.step), Cell::new(record.page)];
        for (frame, page) in record.frames.iter().enumerate() {
            let cell = match page {
                Some(page) => Cell::new(page),
                None => Cell::new("."),
            };
            if record.loaded_into == Some(frame) {
                row.push(cell.fg(Color::Yellow));
            } else {
                row.push(cell);
            }
        }
        if record.fault {
            row.push(Cell::new("FAULT").fg(Color::Red));
        } else {
            row.push(Cell::new("HIT").fg(Color::Green));
        }
        row.push(match record.replaced_frame() {
            Some(frame) => Cell::new(frame),
            None => dash(),
        });
        table.add_row(row);
    }

    format!("{table}\n{}", paging_summary(trace))
}

/// e.g. `Total page faults (FIFO): 9 / 12 (75.00%)`
pub fn paging_summary(trace: &PagingTrace) -> String {
    format!(
        "Total page faults ({}): {} / {} ({:.2}%)",
        trace.policy(),
        trace.fault_count(),
        trace.steps().len(),
        trace.fault_rate() * 100.0
    )
}

pub fn fault_curve_report(curve: &[(usize, usize)]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Frames", "Faults"]);

    let mut previous: Option<usize> = None;
    for &(frame_count, faults) in curve {
        let cell = Cell::new(faults);
        // more frames, more faults: Belady's anomaly
        let cell = match previous {
            Some(previous) if faults > previous => cell.fg(Color::Red),
            _ => cell,
        };
        table.add_row(vec![Cell::new(frame_count), cell]);
        previous = Some(faults);
    }

    table.to_string()
}

pub fn schedule_report(schedule: &Schedule) -> String {
    let gantt: String = schedule
        .gantt()
        .iter()
        .map(|slice| format!("| P{} ({} - {}) ", slice.pid, slice.start, slice.end))
        .collect();

    let mut table = Table::new();
    table.set_header(vec![
        "PID",
        "Arrival",
        "Burst",
        "Priority",
        "Completion",
        "Turnaround",
        "Waiting",
    ]);
    for stats in schedule.stats() {
        table.add_row(vec![
            Cell::new(format!("P{}", stats.pid)),
            Cell::new(stats.arrival),
            Cell::new(stats.burst),
            Cell::new(stats.priority),
            Cell::new(stats.completion),
            Cell::new(stats.turnaround),
            Cell::new(stats.waiting),
        ]);
    }

    format!(
        "Gantt Chart:\n{gantt}|\n{table}\nAverage Turnaround = {:.2}\nAverage Waiting    = {:.2}",
        schedule.average_turnaround(),
        schedule.average_waiting()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim::allocator::{allocate, PlacementPolicy};
    use sim::paging::{fault_curve, run, ReplacementPolicy};
    use sim::scheduler::{schedule, Job, SchedulingPolicy};

    #[test]
    fn test_allocation_report() {
        let allocation = allocate(
            &[100, 500, 200, 300, 600],
            &[212, 417, 112, 426],
            PlacementPolicy::FirstFit,
        )
        .unwrap();
        let report = allocation_report(&allocation);

        assert!(report.contains("Internal Fragmentation"));
        assert!(report.contains("288"));
        assert!(report.contains("Total internal fragmentation: 559"));
        assert!(report.ends_with("Free blocks (index:size): 0:100, 3:300"));
    }

    #[test]
    fn test_allocation_report_without_free_blocks() {
        let allocation = allocate(&[10], &[10], PlacementPolicy::BestFit).unwrap();
        assert!(allocation_report(&allocation).ends_with("Free blocks (index:size): none"));
    }

    #[test]
    fn test_paging_report() {
        let refs = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
        let trace = run(&refs, 3, ReplacementPolicy::Fifo).unwrap();
        let report = paging_report(&trace);

        assert!(report.contains("F2"));
        assert!(report.contains("FAULT"));
        assert!(report.contains("HIT"));
        assert!(report.ends_with("Total page faults (FIFO): 9 / 12 (75.00%)"));
    }

    #[test]
    fn test_fault_curve_report() {
        let refs = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
        let curve = fault_curve(&refs, ReplacementPolicy::Fifo, 3..=4).unwrap();
        let report = fault_curve_report(&curve);

        assert!(report.contains("Frames"));
        assert!(report.contains("10"));
    }

    #[test]
    fn test_schedule_report() {
        let jobs = [Job::new(1, 0, 5, 3), Job::new(2, 1, 3, 1)];
        let schedule = schedule(&jobs, SchedulingPolicy::Fcfs).unwrap();
        let report = schedule_report(&schedule);

        assert!(report.starts_with("Gantt Chart:\n| P1 (0 - 5) | P2 (5 - 8) |\n"));
        assert!(report.contains("Average Turnaround = 6.00"));
        assert!(report.ends_with("Average Waiting    = 2.00"));
    }
}
