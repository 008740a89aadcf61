use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use ossim_error::{errinput, Error};

use crate::typedef::Pid;
use crate::Result;

/// CPU scheduling discipline. Lower priority values run first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchedulingPolicy {
    Fcfs,
    Sjf,
    Priority,
    Srtf,
    RoundRobin { quantum: u64 },
}

impl SchedulingPolicy {
    /// Every policy, with Round Robin using `quantum`.
    pub fn all(quantum: u64) -> [SchedulingPolicy; 5] {
        [
            Self::Fcfs,
            Self::Sjf,
            Self::Priority,
            Self::Srtf,
            Self::RoundRobin { quantum },
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fcfs => "FCFS",
            Self::Sjf => "SJF (non-preemptive)",
            Self::Priority => "Priority (non-preemptive)",
            Self::Srtf => "SRTF (preemptive)",
            Self::RoundRobin { .. } => "Round Robin",
        }
    }
}

impl fmt::Display for SchedulingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin { quantum } => write!(f, "{} (q={quantum})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Parses a policy name. Round Robin gets a quantum of 1; callers that take a
/// quantum from elsewhere replace it.
impl FromStr for SchedulingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "sjf" => Ok(Self::Sjf),
            "priority" | "prio" => Ok(Self::Priority),
            "srtf" => Ok(Self::Srtf),
            "rr" | "round-robin" => Ok(Self::RoundRobin { quantum: 1 }),
            other => errinput!("unknown scheduling policy {other:?}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub arrival: u64,
    pub burst: u64,
    pub priority: u32,
}

impl Job {
    pub fn new(pid: Pid, arrival: u64, burst: u64, priority: u32) -> Self {
        Self {
            pid,
            arrival,
            burst,
            priority,
        }
    }
}

/// A contiguous stretch of CPU time given to one job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    pub pid: Pid,
    pub start: u64,
    pub end: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobStats {
    pub pid: Pid,
    pub arrival: u64,
    pub burst: u64,
    pub priority: u32,
    pub completion: u64,
    pub turnaround: u64,
    pub waiting: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    policy: SchedulingPolicy,
    gantt: Vec<Slice>,
    stats: Vec<JobStats>,
}

impl Schedule {
    pub fn policy(&self) -> SchedulingPolicy {
        self.policy
    }

    /// CPU slices in time order. Idle time has no slice.
    pub fn gantt(&self) -> &[Slice] {
        &self.gantt
    }

    /// Per-job results ordered by pid.
    pub fn stats(&self) -> &[JobStats] {
        &self.stats
    }

    pub fn average_turnaround(&self) -> f64 {
        self.average(|stats| stats.turnaround)
    }

    pub fn average_waiting(&self) -> f64 {
        self.average(|stats| stats.waiting)
    }

    fn average(&self, field: impl Fn(&JobStats) -> u64) -> f64 {
        if self.stats.is_empty() {
            return 0.0;
        }
        // a u64 sum overflows for large bursts
        let total: f64 = self.stats.iter().map(|stats| field(stats) as f64).sum();
        total / self.stats.len() as f64
    }
}

fn advance(time: u64, by: u64) -> Result<u64> {
    time.checked_add(by).ok_or(Error::ArithmeticOverflow)
}

/// Builds a Gantt chart, merging back-to-back slices of the same job.
#[derive(Default)]
struct Timeline {
    slices: Vec<Slice>,
}

impl Timeline {
    fn run(&mut self, pid: Pid, start: u64, end: u64) {
        match self.slices.last_mut() {
            Some(last) if last.pid == pid && last.end == start => last.end = end,
            _ => self.slices.push(Slice { pid, start, end }),
        }
    }
}

/// Bookkeeping shared by every policy: remaining work and completion times.
struct Run<'a> {
    jobs: &'a [Job],
    remaining: Vec<u64>,
    completion: Vec<Option<u64>>,
    timeline: Timeline,
}

impl<'a> Run<'a> {
    fn new(jobs: &'a [Job]) -> Self {
        Self {
            jobs,
            remaining: jobs.iter().map(|job| job.burst).collect(),
            completion: vec![None; jobs.len()],
            timeline: Timeline::default(),
        }
    }

    fn is_done(&self) -> bool {
        self.completion.iter().all(Option::is_some)
    }

    fn is_ready(&self, index: usize, time: u64) -> bool {
        self.remaining[index] > 0 && self.jobs[index].arrival <= time
    }

    /// Earliest arrival among unfinished jobs.
    fn next_arrival(&self) -> Option<u64> {
        (0..self.jobs.len())
            .filter(|&index| self.remaining[index] > 0)
            .map(|index| self.jobs[index].arrival)
            .min()
    }

    /// First arrival strictly after `time`.
    fn next_arrival_after(&self, time: u64) -> Option<u64> {
        self.jobs
            .iter()
            .map(|job| job.arrival)
            .filter(|&arrival| arrival > time)
            .min()
    }

    /// Ready job with the smallest key; ties go to the earlier arrival, then
    /// to input order.
    fn pick(&self, time: u64, key: impl Fn(usize) -> u64) -> Option<usize> {
        (0..self.jobs.len())
            .filter(|&index| self.is_ready(index, time))
            .min_by_key(|&index| (key(index), self.jobs[index].arrival))
    }

    /// Queues, in input order, ready jobs not seen before.
    fn admit(&self, time: u64, admitted: &mut [bool], queue: &mut VecDeque<usize>) {
        for index in 0..self.jobs.len() {
            if !admitted[index] && self.is_ready(index, time) {
                admitted[index] = true;
                queue.push_back(index);
            }
        }
    }

    /// Runs job `index` from `time` for `amount` units and returns the new time.
    fn execute(&mut self, index: usize, time: u64, amount: u64) -> Result<u64> {
        let end = advance(time, amount)?;
        self.timeline.run(self.jobs[index].pid, time, end);
        self.remaining[index] -= amount;
        if self.remaining[index] == 0 {
            self.completion[index] = Some(end);
        }
        Ok(end)
    }

    fn finish(self, policy: SchedulingPolicy) -> Schedule {
        let mut stats: Vec<JobStats> = self
            .jobs
            .iter()
            .zip(&self.completion)
            .map(|(job, completion)| {
                let completion = completion.unwrap_or(job.arrival);
                let turnaround = completion - job.arrival;
                JobStats {
                    pid: job.pid,
                    arrival: job.arrival,
                    burst: job.burst,
                    priority: job.priority,
                    completion,
                    turnaround,
                    waiting: turnaround.saturating_sub(job.burst),
                }
            })
            .collect();
        stats.sort_by_key(|stats| stats.pid);

        Schedule {
            policy,
            gantt: self.timeline.slices,
            stats,
        }
    }
}

fn validate(jobs: &[Job], policy: SchedulingPolicy) -> Result<()> {
    if jobs.is_empty() {
        return errinput!("at least one job is required");
    }
    if let Some(job) = jobs.iter().find(|job| job.burst == 0) {
        return errinput!("job P{} has a zero burst", job.pid);
    }
    let mut pids = HashSet::with_capacity(jobs.len());
    if let Some(job) = jobs.iter().find(|job| !pids.insert(job.pid)) {
        return errinput!("pid P{} appears more than once", job.pid);
    }
    if let SchedulingPolicy::RoundRobin { quantum: 0 } = policy {
        return errinput!("round robin quantum must be positive");
    }
    Ok(())
}

fn fcfs(run: &mut Run) -> Result<()> {
    let mut order: Vec<usize> = (0..run.jobs.len()).collect();
    order.sort_by_key(|&index| (run.jobs[index].arrival, run.jobs[index].pid));

    let mut time: u64 = 0;
    for index in order {
        time = time.max(run.jobs[index].arrival);
        time = run.execute(index, time, run.jobs[index].burst)?;
    }
    Ok(())
}

/// Runs whichever ready job has the smallest `key` to completion, one at a time.
fn non_preemptive(run: &mut Run, key: impl Fn(&Job) -> u64) -> Result<()> {
    let mut time: u64 = 0;
    while !run.is_done() {
        match run.pick(time, |index| key(&run.jobs[index])) {
            Some(index) => time = run.execute(index, time, run.remaining[index])?,
            None => time = run.next_arrival().unwrap_or(time),
        }
    }
    Ok(())
}

fn srtf(run: &mut Run) -> Result<()> {
    let mut time: u64 = 0;
    while !run.is_done() {
        match run.pick(time, |index| run.remaining[index]) {
            // only an arrival can preempt, so run until the next one
            Some(index) => {
                let amount = match run.next_arrival_after(time) {
                    Some(arrival) => run.remaining[index].min(arrival - time),
                    None => run.remaining[index],
                };
                time = run.execute(index, time, amount)?;
            }
            None => time = run.next_arrival().unwrap_or(time),
        }
    }
    Ok(())
}

fn round_robin(run: &mut Run, quantum: u64) -> Result<()> {
    let mut queue = VecDeque::new();
    let mut admitted = vec![false; run.jobs.len()];
    let mut time = run.next_arrival().unwrap_or(0);

    run.admit(time, &mut admitted, &mut queue);
    while !run.is_done() {
        let Some(index) = queue.pop_front() else {
            // nothing ready: jump to the next arrival
            if let Some(next) = run.next_arrival() {
                time = time.max(next);
            }
            run.admit(time, &mut admitted, &mut queue);
            continue;
        };

        let amount = run.remaining[index].min(quantum);
        time = run.execute(index, time, amount)?;

        // arrivals during the slice queue up ahead of the preempted job
        run.admit(time, &mut admitted, &mut queue);
        if run.remaining[index] > 0 {
            queue.push_back(index);
        }
    }
    Ok(())
}

/// Simulates `jobs` on a single CPU under `policy`.
pub fn schedule(jobs: &[Job], policy: SchedulingPolicy) -> Result<Schedule> {
    validate(jobs, policy)?;

    let mut run = Run::new(jobs);
    match policy {
        SchedulingPolicy::Fcfs => fcfs(&mut run)?,
        SchedulingPolicy::Sjf => non_preemptive(&mut run, |job| job.burst)?,
        SchedulingPolicy::Priority => non_preemptive(&mut run, |job| job.priority as u64)?,
        SchedulingPolicy::Srtf => srtf(&mut run)?,
        SchedulingPolicy::RoundRobin { quantum } => round_robin(&mut run, quantum)?,
    }

    let schedule = run.finish(policy);
    log::debug!(
        "{policy}: {} slices, average turnaround {:.2}, average waiting {:.2}",
        schedule.gantt.len(),
        schedule.average_turnaround(),
        schedule.average_waiting()
    );
    Ok(schedule)
}

/// Runs every policy over the same jobs.
pub fn schedule_all(jobs: &[Job], quantum: u64) -> Result<Vec<Schedule>> {
    SchedulingPolicy::all(quantum)
        .iter()
        .map(|&policy| schedule(jobs, policy))
        .collect()
}
