use anyhow::{anyhow, bail, Context, Result};
use sim::allocator::PlacementPolicy;
use sim::paging::ReplacementPolicy;
use sim::parse::{parse_jobs, parse_list};
use sim::scheduler::{Job, SchedulingPolicy};
use sim::PageId;

pub const USAGE: &str = "\
Operating-systems teaching simulators

Usage:
  ossim [OPTIONS] alloc  --blocks <LIST> --processes <LIST> [--policy <POLICY>]
  ossim [OPTIONS] paging --refs <LIST> --frames <N> [--policy <POLICY>] [--sweep <MAX>]
  ossim [OPTIONS] sched  --jobs <JOBS> [--policy <POLICY>] [--quantum <Q>]

Lists are space- or comma-separated numbers, e.g. \"7,0,1,2\" or \"7 0 1 2\".
Jobs are arrival:burst[:priority] entries, e.g. \"0:5:3 1:3:1\".

Policies (default: all):
  alloc   first-fit | best-fit | worst-fit
  paging  fifo | lru | optimal
  sched   fcfs | sjf | priority | srtf | rr

Options:
  -v, --verbose  Log each placement, eviction and dispatch
  -h, --help     Print this help message

Examples:
  ossim alloc --blocks 100,500,200,300,600 --processes 212,417,112,426
  ossim paging --refs \"1 2 3 4 1 2 5 1 2 3 4 5\" --frames 3 --policy fifo --sweep 5
  ossim sched --jobs \"0:5:3 1:3:1 2:8:4 3:6:2\" --policy rr --quantum 2
";

#[derive(Debug, PartialEq)]
pub enum Command {
    Alloc {
        blocks: Vec<u64>,
        processes: Vec<u64>,
        /// `None` runs every policy.
        policy: Option<PlacementPolicy>,
    },
    Paging {
        refs: Vec<PageId>,
        frames: usize,
        policy: Option<ReplacementPolicy>,
        sweep: Option<usize>,
    },
    Sched {
        jobs: Vec<Job>,
        policy: Option<SchedulingPolicy>,
        quantum: u64,
    },
}

#[derive(Debug, PartialEq)]
pub struct Config {
    pub command: Command,
    pub verbose: bool,
}

#[derive(Debug, PartialEq)]
pub enum Parsed {
    Run(Config),
    Help,
}

/// Option values keyed by flag, in the order given.
#[derive(Default)]
struct Options {
    values: Vec<(String, String)>,
}

impl Options {
    fn take(&mut self, flag: &str) -> Option<String> {
        let index = self.values.iter().position(|(name, _)| name == flag)?;
        Some(self.values.remove(index).1)
    }

    fn require(&mut self, flag: &str) -> Result<String> {
        self.take(flag)
            .ok_or_else(|| anyhow!("missing required option --{flag}"))
    }

    fn finish(self) -> Result<()> {
        match self.values.first() {
            Some((name, _)) => bail!("unexpected option --{name}"),
            None => Ok(()),
        }
    }
}

fn policy<T>(options: &mut Options) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = sim::Error>,
{
    match options.take("policy") {
        None => Ok(None),
        Some(value) if value.eq_ignore_ascii_case("all") => Ok(None),
        Some(value) => Ok(Some(value.parse::<T>()?)),
    }
}

fn number<T>(flag: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("--{flag} expects a number, got {value:?}"))
}

pub fn parse_args<I>(args: I) -> Result<Parsed>
where
    I: IntoIterator<Item = String>,
{
    let mut verbose = false;
    let mut subcommand: Option<String> = None;
    let mut options = Options::default();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "-v" | "--verbose" => verbose = true,
            _ if arg.starts_with("--") => {
                let flag = &arg[2..];
                let (name, value) = match flag.split_once('=') {
                    Some((name, value)) => (name.to_string(), value.to_string()),
                    None => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("option --{flag} needs a value"))?;
                        (flag.to_string(), value)
                    }
                };
                options.values.push((name, value));
            }
            _ if arg.starts_with('-') => bail!("unknown option: {arg}"),
            _ if subcommand.is_none() => subcommand = Some(arg),
            _ => bail!("unexpected argument: {arg}"),
        }
    }

    let command = match subcommand.as_deref() {
        Some("alloc") => Command::Alloc {
            blocks: parse_list(&options.require("blocks")?)?,
            processes: parse_list(&options.require("processes")?)?,
            policy: policy(&mut options)?,
        },
        Some("paging") => {
            let refs = parse_list(&options.require("refs")?)?;
            let frames = number("frames", &options.require("frames")?)?;
            let sweep = match options.take("sweep") {
                Some(value) => Some(number("sweep", &value)?),
                None => None,
            };
            Command::Paging {
                refs,
                frames,
                policy: policy(&mut options)?,
                sweep,
            }
        }
        Some("sched") => {
            let jobs = parse_jobs(&options.require("jobs")?)?;
            let quantum = match options.take("quantum") {
                Some(value) => number("quantum", &value)?,
                None => 1,
            };
            let policy = match policy(&mut options)? {
                Some(SchedulingPolicy::RoundRobin { .. }) => {
                    Some(SchedulingPolicy::RoundRobin { quantum })
                }
                other => other,
            };
            Command::Sched {
                jobs,
                policy,
                quantum,
            }
        }
        Some(other) => bail!("unknown command: {other}"),
        None => bail!("expected a command: alloc, paging or sched"),
    };
    options.finish()?;

    Ok(Parsed::Run(Config { command, verbose }))
}
