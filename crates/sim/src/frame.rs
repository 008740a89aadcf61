use std::collections::{HashMap, VecDeque};

use crate::typedef::{FrameId, PageId};

/// A fixed number of page frames, each either empty or holding one page.
#[derive(Clone, Debug)]
pub struct FrameSet {
    slots: Vec<Option<PageId>>,
    page_table: HashMap<PageId, FrameId>,
    free_list: VecDeque<FrameId>,
}

impl FrameSet {
    /// Creates `capacity` empty frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            page_table: HashMap::with_capacity(capacity),
            free_list: (0..capacity).collect(),
        }
    }

    /// Returns the frame holding `page_id`, if it is resident.
    pub fn lookup(&self, page_id: PageId) -> Option<FrameId> {
        self.page_table.get(&page_id).copied()
    }

    /// Takes the lowest-index frame that has never been filled.
    pub fn take_free_frame(&mut self) -> Option<FrameId> {
        self.free_list.pop_front()
    }

    /// Places `page_id` in `frame_id` and returns the page it displaced.
    pub fn load(&mut self, frame_id: FrameId, page_id: PageId) -> Option<PageId> {
        assert!(
            !self.page_table.contains_key(&page_id),
            "page {page_id} is already resident"
        );

        let evicted = self.slots[frame_id].replace(page_id);
        if let Some(old) = evicted {
            self.page_table.remove(&old);
        }
        self.page_table.insert(page_id, frame_id);

        evicted
    }

    /// Copies the current frame contents.
    pub fn snapshot(&self) -> Vec<Option<PageId>> {
        self.slots.clone()
    }
}
