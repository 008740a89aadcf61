use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use ossim_error::{errinput, Error};

use crate::typedef::BlockId;
use crate::Result;

/// Rule for picking among the free blocks large enough for a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementPolicy {
    FirstFit,
    BestFit,
    WorstFit,
}

impl PlacementPolicy {
    pub const ALL: [PlacementPolicy; 3] = [Self::FirstFit, Self::BestFit, Self::WorstFit];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstFit => "First-Fit",
            Self::BestFit => "Best-Fit",
            Self::WorstFit => "Worst-Fit",
        }
    }

    fn select(&self, blocks: &[Block], demand: u64) -> Option<BlockId> {
        match self {
            Self::FirstFit => first_fit(blocks, demand),
            Self::BestFit => best_fit(blocks, demand),
            Self::WorstFit => worst_fit(blocks, demand),
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlacementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first-fit" | "firstfit" | "first" | "ff" => Ok(Self::FirstFit),
            "best-fit" | "bestfit" | "best" | "bf" => Ok(Self::BestFit),
            "worst-fit" | "worstfit" | "worst" | "wf" => Ok(Self::WorstFit),
            other => errinput!("unknown placement policy {other:?}"),
        }
    }
}

/// A memory block of fixed capacity that can hold at most one process.
#[derive(Clone, Copy, Debug)]
struct Block {
    capacity: u64,
    allocated: bool,
}

impl Block {
    fn new(capacity: u64) -> Self {
        Self {
            capacity,
            allocated: false,
        }
    }

    fn fits(&self, demand: u64) -> bool {
        !self.allocated && self.capacity >= demand
    }

    fn claim(&mut self) {
        assert!(!self.allocated, "block claimed twice");
        self.allocated = true;
    }
}

fn candidates(blocks: &[Block], demand: u64) -> impl Iterator<Item = (BlockId, &Block)> {
    blocks.iter().enumerate().filter(move |(_, block)| block.fits(demand))
}

fn first_fit(blocks: &[Block], demand: u64) -> Option<BlockId> {
    candidates(blocks, demand).map(|(id, _)| id).next()
}

// `min_by_key` returns the first of several equal minimums, which gives both
// scans below their lowest-index tie-break.

fn best_fit(blocks: &[Block], demand: u64) -> Option<BlockId> {
    candidates(blocks, demand)
        .min_by_key(|(_, block)| block.capacity - demand)
        .map(|(id, _)| id)
}

fn worst_fit(blocks: &[Block], demand: u64) -> Option<BlockId> {
    candidates(blocks, demand)
        .min_by_key(|(_, block)| Reverse(block.capacity))
        .map(|(id, _)| id)
}

/// One row of an allocation: where a process went and what it wasted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub process: usize,
    pub size: u64,
    pub block: Option<BlockId>,
    pub block_size: Option<u64>,
    pub fragmentation: Option<u64>,
}

/// Result of placing every process once under one policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    policy: PlacementPolicy,
    blocks: Vec<u64>,
    processes: Vec<u64>,
    assignments: Vec<Option<BlockId>>,
}

impl Allocation {
    pub fn policy(&self) -> PlacementPolicy {
        self.policy
    }

    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    pub fn processes(&self) -> &[u64] {
        &self.processes
    }

    /// Block chosen for each process, `None` where nothing fit.
    pub fn assignments(&self) -> &[Option<BlockId>] {
        &self.assignments
    }

    pub fn block_of(&self, process: usize) -> Option<BlockId> {
        self.assignments.get(process).copied().flatten()
    }

    /// Internal fragmentation of a placed process.
    pub fn fragmentation(&self, process: usize) -> Option<u64> {
        self.block_of(process)
            .map(|block| self.blocks[block] - self.processes[process])
    }

    pub fn total_fragmentation(&self) -> u64 {
        (0..self.processes.len())
            .filter_map(|process| self.fragmentation(process))
            .sum()
    }

    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.processes
            .iter()
            .enumerate()
            .map(move |(process, &size)| {
                let block = self.block_of(process);
                Placement {
                    process,
                    size,
                    block,
                    block_size: block.map(|id| self.blocks[id]),
                    fragmentation: self.fragmentation(process),
                }
            })
    }

    /// Processes that no block could hold.
    pub fn unallocated(&self) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_none())
            .map(|(process, _)| process)
            .collect()
    }

    /// Blocks left without a process, in index order.
    pub fn free_blocks(&self) -> Vec<BlockId> {
        (0..self.blocks.len())
            .filter(|block| !self.assignments.contains(&Some(*block)))
            .collect()
    }
}

/// Places each process, in order, into a free block chosen by `policy`.
pub fn allocate(blocks: &[u64], processes: &[u64], policy: PlacementPolicy) -> Result<Allocation> {
    if let Some(block) = blocks.iter().position(|&capacity| capacity == 0) {
        return errinput!("block {block} has zero capacity");
    }
    if let Some(process) = processes.iter().position(|&size| size == 0) {
        return errinput!("process {process} requests zero memory");
    }

    let mut state: Vec<Block> = blocks.iter().map(|&capacity| Block::new(capacity)).collect();
    let mut assignments = Vec::with_capacity(processes.len());

    for (process, &demand) in processes.iter().enumerate() {
        let chosen = policy.select(&state, demand);
        match chosen {
            Some(block) => {
                state[block].claim();
                log::debug!(
                    "{policy}: process {process} ({demand}) -> block {block} ({})",
                    blocks[block]
                );
            }
            None => log::debug!("{policy}: process {process} ({demand}) not allocated"),
        }
        assignments.push(chosen);
    }

    Ok(Allocation {
        policy,
        blocks: blocks.to_vec(),
        processes: processes.to_vec(),
        assignments,
    })
}

/// Runs every placement policy over the same input.
pub fn allocate_all(blocks: &[u64], processes: &[u64]) -> Result<Vec<Allocation>> {
    PlacementPolicy::ALL
        .iter()
        .map(|&policy| allocate(blocks, processes, policy))
        .collect()
}
