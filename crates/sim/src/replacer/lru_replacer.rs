use std::collections::HashMap;

use crate::typedef::FrameId;

use super::Replacer;

struct LruNode {
    frame_id: FrameId,
    last_accessed_step: usize,
}

/// Evicts the frame whose page was referenced least recently. The reference
/// that loaded a page counts as its first access.
pub struct LruReplacer {
    node_store: HashMap<FrameId, LruNode>,
}

impl LruReplacer {
    pub fn new(frame_count: usize) -> Self {
        LruReplacer {
            node_store: HashMap::with_capacity(frame_count),
        }
    }
}

impl Replacer for LruReplacer {
    fn record_load(&mut self, frame_id: FrameId, step: usize) {
        self.record_access(frame_id, step);
    }

    /// Records an access and updates the step.
    /// If the frame_id is new, create a new node.
    fn record_access(&mut self, frame_id: FrameId, step: usize) {
        match self.node_store.get_mut(&frame_id) {
            Some(node) => {
                node.last_accessed_step = step;
            }
            None => {
                let node = LruNode {
                    frame_id,
                    last_accessed_step: step,
                };
                self.node_store.insert(frame_id, node);
            }
        }
    }

    /// Evicts the least recently used frame. Steps are unique, so the minimum
    /// never depends on map iteration order.
    fn evict(&mut self) -> Option<FrameId> {
        let lru_frame = self
            .node_store
            .values()
            .min_by_key(|node| node.last_accessed_step)
            .map(|node| node.frame_id)?;

        self.node_store.remove(&lru_frame);
        Some(lru_frame)
    }

    fn size(&self) -> usize {
        self.node_store.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_load() {
        let mut lru = LruReplacer::new(3);

        lru.record_load(0, 0);
        lru.record_load(1, 1);
        lru.record_load(2, 2);

        assert_eq!(lru.size(), 3);
    }

    #[test]
    fn test_evict() {
        let mut lru = LruReplacer::new(3);

        lru.record_load(0, 0);
        lru.record_load(1, 1);
        lru.record_load(2, 2);

        assert_eq!(lru.evict(), Some(0));
        assert_eq!(lru.evict(), Some(1));
        assert_eq!(lru.evict(), Some(2));
        assert_eq!(lru.evict(), None);
        assert_eq!(lru.size(), 0);
    }

    #[test]
    fn test_access_refreshes_recency() {
        let mut lru = LruReplacer::new(3);

        lru.record_load(0, 0);
        lru.record_load(1, 1);
        lru.record_load(2, 2);

        lru.record_access(0, 3);

        assert_eq!(lru.evict(), Some(1));
        assert_eq!(lru.evict(), Some(2));
        assert_eq!(lru.evict(), Some(0));
    }

    #[test]
    fn test_reload_after_evict() {
        let mut lru = LruReplacer::new(2);

        lru.record_load(0, 0);
        lru.record_load(1, 1);

        let victim = lru.evict().unwrap();
        assert_eq!(victim, 0);
        lru.record_load(victim, 2);

        assert_eq!(lru.size(), 2);
        assert_eq!(lru.evict(), Some(1));
    }
}
