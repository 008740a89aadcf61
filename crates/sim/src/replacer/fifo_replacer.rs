use std::collections::VecDeque;

use crate::typedef::FrameId;

use super::Replacer;

/// Evicts the frame whose current page was loaded earliest. Hits never
/// reorder the queue.
pub struct FifoReplacer {
    queue: VecDeque<FrameId>,
}

impl FifoReplacer {
    pub fn new(frame_count: usize) -> Self {
        FifoReplacer {
            queue: VecDeque::with_capacity(frame_count),
        }
    }
}

impl Replacer for FifoReplacer {
    fn record_load(&mut self, frame_id: FrameId, _step: usize) {
        self.queue.push_back(frame_id);
    }

    fn record_access(&mut self, _frame_id: FrameId, _step: usize) {}

    fn evict(&mut self) -> Option<FrameId> {
        self.queue.pop_front()
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evict_in_load_order() {
        let mut fifo = FifoReplacer::new(3);

        fifo.record_load(0, 0);
        fifo.record_load(1, 1);
        fifo.record_load(2, 2);
        assert_eq!(fifo.size(), 3);

        assert_eq!(fifo.evict(), Some(0));
        assert_eq!(fifo.evict(), Some(1));
        assert_eq!(fifo.evict(), Some(2));
        assert_eq!(fifo.evict(), None);
    }

    #[test]
    fn test_access_does_not_reorder() {
        let mut fifo = FifoReplacer::new(2);

        fifo.record_load(0, 0);
        fifo.record_load(1, 1);
        fifo.record_access(0, 2);

        assert_eq!(fifo.evict(), Some(0));
    }

    #[test]
    fn test_reloaded_frame_goes_to_tail() {
        let mut fifo = FifoReplacer::new(2);

        fifo.record_load(0, 0);
        fifo.record_load(1, 1);

        let victim = fifo.evict().unwrap();
        fifo.record_load(victim, 2);

        assert_eq!(fifo.evict(), Some(1));
        assert_eq!(fifo.evict(), Some(0));
    }
}
