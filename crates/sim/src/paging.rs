use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use ossim_error::{errinput, Error};

use crate::frame::FrameSet;
use crate::replacer::{FifoReplacer, LruReplacer, OptimalReplacer, Replacer};
use crate::typedef::{FrameId, PageId};
use crate::Result;

/// Page-replacement policy used once every frame holds a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplacementPolicy {
    Fifo,
    Lru,
    Optimal,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 3] = [Self::Fifo, Self::Lru, Self::Optimal];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::Lru => "LRU",
            Self::Optimal => "Optimal",
        }
    }

    /// Builds the replacer for one run over `refs`.
    fn replacer(&self, refs: &[PageId], frame_count: usize) -> Box<dyn Replacer> {
        match self {
            Self::Fifo => Box::new(FifoReplacer::new(frame_count)),
            Self::Lru => Box::new(LruReplacer::new(frame_count)),
            Self::Optimal => Box::new(OptimalReplacer::new(refs, frame_count)),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReplacementPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "lru" => Ok(Self::Lru),
            "optimal" | "opt" | "min" => Ok(Self::Optimal),
            other => errinput!("unknown replacement policy {other:?}"),
        }
    }
}

/// A resident page pushed out by a fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    pub frame: FrameId,
    pub page: PageId,
}

/// What happened at one position of the reference string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRecord {
    pub step: usize,
    pub page: PageId,
    /// Frame contents right after this reference was served.
    pub frames: Vec<Option<PageId>>,
    pub fault: bool,
    /// Frame that received `page`, set on every fault.
    pub loaded_into: Option<FrameId>,
    /// Set only when the fault overwrote a resident page.
    pub evicted: Option<Eviction>,
}

impl StepRecord {
    /// The frame slot overwritten by an eviction, if any.
    pub fn replaced_frame(&self) -> Option<FrameId> {
        self.evicted.map(|eviction| eviction.frame)
    }
}

/// The full trace of one page-replacement run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagingTrace {
    policy: ReplacementPolicy,
    frame_count: usize,
    steps: Vec<StepRecord>,
    fault_count: usize,
}

impl PagingTrace {
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn fault_count(&self) -> usize {
        self.fault_count
    }

    pub fn hit_count(&self) -> usize {
        self.steps.len() - self.fault_count
    }

    /// Faults per reference, 0.0 for an empty reference string.
    pub fn fault_rate(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.fault_count as f64 / self.steps.len() as f64
    }
}

/// Serves references against a frame set, consulting the replacer on faults.
struct Pager {
    frames: FrameSet,
    replacer: Box<dyn Replacer>,
}

impl Pager {
    fn new(frame_count: usize, replacer: Box<dyn Replacer>) -> Self {
        Self {
            frames: FrameSet::new(frame_count),
            replacer,
        }
    }

    /// Finds a frame for a faulting page: an empty one if any remains,
    /// otherwise the replacer's victim.
    fn get_free_frame(&mut self) -> FrameId {
        // use the free list while frames are still empty
        if let Some(frame_id) = self.frames.take_free_frame() {
            return frame_id;
        }

        // otherwise evict a frame; every frame is tracked once the set is full
        match self.replacer.evict() {
            Some(frame_id) => frame_id,
            None => panic!("replacer had no victim while all frames were full"),
        }
    }

    fn reference(&mut self, step: usize, page_id: PageId) -> StepRecord {
        if let Some(frame_id) = self.frames.lookup(page_id) {
            self.replacer.record_access(frame_id, step);
            log::trace!("step {step}: page {page_id} hit in frame {frame_id}");

            return StepRecord {
                step,
                page: page_id,
                frames: self.frames.snapshot(),
                fault: false,
                loaded_into: None,
                evicted: None,
            };
        }

        let frame_id = self.get_free_frame();
        let evicted = self
            .frames
            .load(frame_id, page_id)
            .map(|page| Eviction { frame: frame_id, page });
        self.replacer.record_load(frame_id, step);

        match evicted {
            Some(eviction) => log::debug!(
                "step {step}: page {page_id} faulted, evicted page {} from frame {frame_id}",
                eviction.page
            ),
            None => log::debug!("step {step}: page {page_id} faulted into empty frame {frame_id}"),
        }

        StepRecord {
            step,
            page: page_id,
            frames: self.frames.snapshot(),
            fault: true,
            loaded_into: Some(frame_id),
            evicted,
        }
    }
}

/// Replays `refs` against `frame_count` frames under `policy`.
pub fn run(refs: &[PageId], frame_count: usize, policy: ReplacementPolicy) -> Result<PagingTrace> {
    if frame_count == 0 {
        return errinput!("frame count must be positive");
    }

    let mut pager = Pager::new(frame_count, policy.replacer(refs, frame_count));
    let steps: Vec<StepRecord> = refs
        .iter()
        .enumerate()
        .map(|(step, &page_id)| pager.reference(step, page_id))
        .collect();
    let fault_count = steps.iter().filter(|record| record.fault).count();

    log::debug!(
        "{policy} over {} references with {frame_count} frames: {fault_count} faults",
        refs.len()
    );

    Ok(PagingTrace {
        policy,
        frame_count,
        steps,
        fault_count,
    })
}

/// Runs every policy over the same reference string.
pub fn run_all(refs: &[PageId], frame_count: usize) -> Result<Vec<PagingTrace>> {
    ReplacementPolicy::ALL
        .iter()
        .map(|&policy| run(refs, frame_count, policy))
        .collect()
}

/// Fault counts of `policy` for each frame count in `frame_counts`.
pub fn fault_curve(
    refs: &[PageId],
    policy: ReplacementPolicy,
    frame_counts: RangeInclusive<usize>,
) -> Result<Vec<(usize, usize)>> {
    frame_counts
        .map(|frame_count| Ok((frame_count, run(refs, frame_count, policy)?.fault_count())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BELADY: [PageId; 12] = [1, 2, 3, 4, 1, 2, 5, 1, 2, 3, 4, 5];
    const TEXTBOOK: [PageId; 13] = [7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2];

    fn frames_of(trace: &PagingTrace) -> Vec<Vec<Option<PageId>>> {
        trace.steps().iter().map(|r| r.frames.clone()).collect()
    }

    fn replaced_of(trace: &PagingTrace) -> Vec<Option<FrameId>> {
        trace.steps().iter().map(|r| r.replaced_frame()).collect()
    }

    #[test]
    fn test_fifo_belady_anomaly() {
        assert_eq!(run(&BELADY, 3, ReplacementPolicy::Fifo).unwrap().fault_count(), 9);
        assert_eq!(run(&BELADY, 4, ReplacementPolicy::Fifo).unwrap().fault_count(), 10);
    }

    #[test]
    fn test_lru_has_no_anomaly() {
        assert_eq!(run(&BELADY, 3, ReplacementPolicy::Lru).unwrap().fault_count(), 10);
        assert_eq!(run(&BELADY, 4, ReplacementPolicy::Lru).unwrap().fault_count(), 8);
    }

    #[test]
    fn test_optimal_is_a_lower_bound() {
        let fifo = run(&TEXTBOOK, 3, ReplacementPolicy::Fifo).unwrap();
        let lru = run(&TEXTBOOK, 3, ReplacementPolicy::Lru).unwrap();
        let opt = run(&TEXTBOOK, 3, ReplacementPolicy::Optimal).unwrap();

        assert_eq!(fifo.fault_count(), 10);
        assert_eq!(lru.fault_count(), 9);
        assert_eq!(opt.fault_count(), 7);
        assert!(opt.fault_count() <= fifo.fault_count());
        assert!(opt.fault_count() <= lru.fault_count());
    }

    #[test]
    fn test_fifo_trace() {
        let trace = run(&TEXTBOOK, 3, ReplacementPolicy::Fifo).unwrap();

        let steps = trace.steps();
        assert_eq!(steps[0].frames, vec![Some(7), None, None]);
        assert_eq!(steps[0].loaded_into, Some(0));
        assert_eq!(steps[0].evicted, None);

        assert_eq!(steps[3].frames, vec![Some(2), Some(0), Some(1)]);
        assert_eq!(steps[3].evicted, Some(Eviction { frame: 0, page: 7 }));

        // the hit on 0 at step 4 does not protect it from eviction at step 6
        assert!(!steps[4].fault);
        assert_eq!(steps[5].evicted, Some(Eviction { frame: 1, page: 0 }));
        assert_eq!(steps[6].frames, vec![Some(2), Some(3), Some(0)]);

        assert_eq!(
            replaced_of(&trace),
            vec![None, None, None, Some(0), None, Some(1), Some(2), Some(0), Some(1), Some(2), Some(0), None, None]
        );
    }

    #[test]
    fn test_lru_trace() {
        let trace = run(&TEXTBOOK, 3, ReplacementPolicy::Lru).unwrap();

        assert_eq!(
            replaced_of(&trace),
            vec![None, None, None, Some(0), None, Some(2), None, Some(0), Some(2), Some(1), Some(0), None, None]
        );
        assert_eq!(trace.steps()[12].frames, vec![Some(0), Some(3), Some(2)]);
    }

    #[test]
    fn test_optimal_trace() {
        let trace = run(&TEXTBOOK, 3, ReplacementPolicy::Optimal).unwrap();

        assert_eq!(
            frames_of(&trace)[7..].to_vec(),
            vec![
                vec![Some(2), Some(4), Some(3)],
                vec![Some(2), Some(4), Some(3)],
                vec![Some(2), Some(4), Some(3)],
                vec![Some(2), Some(0), Some(3)],
                vec![Some(2), Some(0), Some(3)],
                vec![Some(2), Some(0), Some(3)],
            ]
        );
        assert_eq!(trace.steps()[7].evicted, Some(Eviction { frame: 1, page: 0 }));
        assert_eq!(trace.steps()[10].evicted, Some(Eviction { frame: 1, page: 4 }));
    }

    #[test]
    fn test_fault_count_matches_records() {
        for policy in ReplacementPolicy::ALL {
            for frame_count in 1..=5 {
                let trace = run(&TEXTBOOK, frame_count, policy).unwrap();
                let faults = trace.steps().iter().filter(|r| r.fault).count();

                assert_eq!(trace.fault_count(), faults);
                assert_eq!(trace.hit_count() + faults, TEXTBOOK.len());
                assert_eq!(trace.steps().len(), TEXTBOOK.len());
            }
        }
    }

    #[test]
    fn test_resident_pages_were_referenced() {
        for policy in ReplacementPolicy::ALL {
            let trace = run(&BELADY, 3, policy).unwrap();
            for record in trace.steps() {
                assert!(record.frames.len() <= 3);
                assert!(record.frames.contains(&Some(record.page)));
                for page in record.frames.iter().flatten() {
                    assert!(BELADY[..=record.step].contains(page));
                }
            }
        }
    }

    #[test]
    fn test_resident_page_is_always_a_hit() {
        let trace = run(&[1, 1, 2, 1, 2], 2, ReplacementPolicy::Fifo).unwrap();
        let faults: Vec<bool> = trace.steps().iter().map(|r| r.fault).collect();
        assert_eq!(faults, vec![true, false, true, false, false]);
    }

    #[test]
    fn test_single_frame() {
        let trace = run(&[1, 2, 1], 1, ReplacementPolicy::Lru).unwrap();

        assert_eq!(trace.fault_count(), 3);
        assert_eq!(trace.steps()[2].evicted, Some(Eviction { frame: 0, page: 2 }));
    }

    #[test]
    fn test_empty_reference_string() {
        let trace = run(&[], 3, ReplacementPolicy::Optimal).unwrap();

        assert!(trace.steps().is_empty());
        assert_eq!(trace.fault_count(), 0);
        assert_eq!(trace.fault_rate(), 0.0);
    }

    #[test]
    fn test_zero_frames_rejected() {
        let err = run(&BELADY, 0, ReplacementPolicy::Fifo).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_runs_are_reproducible() {
        for policy in ReplacementPolicy::ALL {
            let first = run(&TEXTBOOK, 3, policy).unwrap();
            let second = run(&TEXTBOOK, 3, policy).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_run_all_and_fault_rate() {
        let traces = run_all(&BELADY, 3).unwrap();

        let policies: Vec<ReplacementPolicy> = traces.iter().map(|t| t.policy()).collect();
        assert_eq!(policies, ReplacementPolicy::ALL.to_vec());
        assert_eq!(traces[0].fault_rate(), 0.75);
        assert_eq!(traces[0].frame_count(), 3);
    }

    #[test]
    fn test_fault_curve() {
        let curve = fault_curve(&BELADY, ReplacementPolicy::Fifo, 1..=5).unwrap();
        assert_eq!(curve, vec![(1, 12), (2, 12), (3, 9), (4, 10), (5, 5)]);

        assert!(fault_curve(&BELADY, ReplacementPolicy::Fifo, 0..=2).is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("FIFO".parse::<ReplacementPolicy>(), Ok(ReplacementPolicy::Fifo));
        assert_eq!("lru".parse::<ReplacementPolicy>(), Ok(ReplacementPolicy::Lru));
        assert_eq!("opt".parse::<ReplacementPolicy>(), Ok(ReplacementPolicy::Optimal));
        assert!("clock".parse::<ReplacementPolicy>().is_err());
    }
}
