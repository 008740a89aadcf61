use std::cmp::Reverse;
use std::collections::HashMap;

use crate::typedef::{FrameId, PageId};

use super::Replacer;

/// Belady's clairvoyant policy: evicts the page whose next reference lies
/// furthest ahead in the reference string.
pub struct OptimalReplacer {
    /// `next_use[i]` is the index of the next reference to `refs[i]` after `i`.
    next_use: Vec<Option<usize>>,
    /// Step of the latest reference to the page held by each frame.
    last_ref: Vec<Option<usize>>,
}

impl OptimalReplacer {
    pub fn new(refs: &[PageId], frame_count: usize) -> Self {
        OptimalReplacer {
            next_use: next_use_table(refs),
            last_ref: vec![None; frame_count],
        }
    }

    /// Position of the next reference to the page in `frame_id`, `None` if the
    /// page is never referenced again.
    fn next_use_of(&self, frame_id: FrameId) -> Option<usize> {
        self.last_ref[frame_id].and_then(|step| self.next_use[step])
    }
}

/// Builds the next-occurrence table with one backwards pass over `refs`.
fn next_use_table(refs: &[PageId]) -> Vec<Option<usize>> {
    let mut seen = HashMap::new();
    let mut table = vec![None; refs.len()];

    for (step, page_id) in refs.iter().enumerate().rev() {
        table[step] = seen.insert(*page_id, step);
    }

    table
}

impl Replacer for OptimalReplacer {
    fn record_load(&mut self, frame_id: FrameId, step: usize) {
        self.last_ref[frame_id] = Some(step);
    }

    // No reference to the page lies between its latest one and the current
    // step, so the next use after its latest reference is also the next use
    // after now.
    fn record_access(&mut self, frame_id: FrameId, step: usize) {
        self.last_ref[frame_id] = Some(step);
    }

    fn evict(&mut self) -> Option<FrameId> {
        // A page with no future reference is infinitely far away. `min_by_key`
        // keeps the first of equal keys, so ties go to the lowest frame.
        let victim = (0..self.last_ref.len())
            .filter(|&frame_id| self.last_ref[frame_id].is_some())
            .min_by_key(|&frame_id| Reverse(self.next_use_of(frame_id).unwrap_or(usize::MAX)))?;

        self.last_ref[victim] = None;
        Some(victim)
    }

    fn size(&self) -> usize {
        self.last_ref.iter().filter(|step| step.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_use_table() {
        let table = next_use_table(&[7, 0, 7, 1, 0]);
        assert_eq!(table, vec![Some(2), Some(4), None, None, None]);
    }

    #[test]
    fn test_evict_furthest_next_use() {
        let refs = [1, 2, 3, 4, 2, 1];
        let mut opt = OptimalReplacer::new(&refs, 3);

        opt.record_load(0, 0);
        opt.record_load(1, 1);
        opt.record_load(2, 2);

        // At step 3: page 1 next at 5, page 2 at 4, page 3 never.
        assert_eq!(opt.evict(), Some(2));
        opt.record_load(2, 3);

        // Now page 4 (frame 2) is never used again.
        assert_eq!(opt.evict(), Some(2));
    }

    #[test]
    fn test_ties_go_to_lowest_frame() {
        let refs = [1, 2, 3, 4];
        let mut opt = OptimalReplacer::new(&refs, 3);

        opt.record_load(0, 0);
        opt.record_load(1, 1);
        opt.record_load(2, 2);

        assert_eq!(opt.evict(), Some(0));
        assert_eq!(opt.evict(), Some(1));
        assert_eq!(opt.evict(), Some(2));
        assert_eq!(opt.evict(), None);
    }

    #[test]
    fn test_access_moves_next_use_forward() {
        let refs = [1, 2, 1, 3, 2, 1];
        let mut opt = OptimalReplacer::new(&refs, 2);

        opt.record_load(0, 0);
        opt.record_load(1, 1);
        opt.record_access(0, 2);
        assert_eq!(opt.size(), 2);

        // At step 3: page 1 next at 5, page 2 next at 4.
        assert_eq!(opt.evict(), Some(0));
    }
}
