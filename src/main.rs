//! ossim - operating-systems teaching simulators
//!
//! Usage: ossim [OPTIONS] <alloc|paging|sched> ...
//!
//! Commands:
//!   alloc   - contiguous memory allocation (first/best/worst fit)
//!   paging  - page replacement (FIFO, LRU, Optimal) with a step-by-step trace
//!   sched   - CPU scheduling (FCFS, SJF, Priority, SRTF, Round Robin)
//!
//! Run with --help for the full option list. Set RUST_LOG to override the
//! log level chosen by --verbose.

mod cli;
mod report;

use std::process;

use anyhow::{Context, Result};
use cli::{Command, Config, Parsed};
use sim::allocator::{allocate, allocate_all};
use sim::paging::{fault_curve, run, run_all};
use sim::scheduler::{schedule, schedule_all};

fn main() {
    let config = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Parsed::Run(config)) => config,
        Ok(Parsed::Help) => {
            print!("{}", cli::USAGE);
            return;
        }
        Err(e) => {
            eprintln!("Error: {e:#}\nUse --help for usage information.");
            process::exit(1);
        }
    };

    init_logger(config.verbose);

    if let Err(e) = run_command(&config) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run_command(config: &Config) -> Result<()> {
    let what = match config.command {
        Command::Alloc { .. } => "allocation",
        Command::Paging { .. } => "page replacement",
        Command::Sched { .. } => "scheduling",
    };
    simulate(&config.command).with_context(|| format!("{what} simulation failed"))
}

fn simulate(command: &Command) -> Result<()> {
    match command {
        Command::Alloc {
            blocks,
            processes,
            policy,
        } => {
            println!("Blocks: {blocks:?}");
            println!("Processes: {processes:?}");

            let allocations = match *policy {
                Some(policy) => vec![allocate(blocks, processes, policy)?],
                None => allocate_all(blocks, processes)?,
            };
            for allocation in allocations {
                let policy = allocation.policy();
                log::info!(
                    "{policy}: {} of {} processes placed",
                    processes.len() - allocation.unallocated().len(),
                    processes.len()
                );

                println!("\n--- {policy} ---");
                println!("{}", report::allocation_report(&allocation));
            }
        }
        Command::Paging {
            refs,
            frames,
            policy,
            sweep,
        } => {
            let traces = match *policy {
                Some(policy) => vec![run(refs, *frames, policy)?],
                None => run_all(refs, *frames)?,
            };
            for trace in traces {
                let policy = trace.policy();
                log::info!("{}", report::paging_summary(&trace));

                println!("\n=== {policy} Page Replacement ===");
                println!("{}", report::paging_report(&trace));

                if let Some(max_frames) = *sweep {
                    let curve = fault_curve(refs, policy, 1..=max_frames)
                        .with_context(|| format!("{policy} frame sweep failed"))?;
                    println!("\nFaults by frame count ({policy}):");
                    println!("{}", report::fault_curve_report(&curve));
                }
            }
        }
        Command::Sched {
            jobs,
            policy,
            quantum,
        } => {
            let schedules = match *policy {
                Some(policy) => vec![schedule(jobs, policy)?],
                None => schedule_all(jobs, *quantum)?,
            };
            for schedule in schedules {
                let policy = schedule.policy();
                println!("\n==== {policy} ====");
                println!("{}", report::schedule_report(&schedule));
            }
        }
    }

    Ok(())
}
