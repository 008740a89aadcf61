mod fifo_replacer;
mod lru_replacer;
mod optimal_replacer;

pub use fifo_replacer::FifoReplacer;
pub use lru_replacer::LruReplacer;
pub use optimal_replacer::OptimalReplacer;

use crate::typedef::FrameId;

/// Tracks frame usage and picks the frame to overwrite once every frame is full.
pub trait Replacer {
    /// Record that `frame_id` received a new page at reference `step`.
    fn record_load(&mut self, frame_id: FrameId, step: usize);

    /// Record a hit on `frame_id` at reference `step`.
    fn record_access(&mut self, frame_id: FrameId, step: usize);

    /// Attempts to pick a victim frame based on the replacement policy.
    /// Returns `Some(frame_id)` and forgets the frame, otherwise `None`.
    fn evict(&mut self) -> Option<FrameId>;

    /// Returns the number of frames the replacer is tracking.
    fn size(&self) -> usize;
}
