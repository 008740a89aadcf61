/// Identifier of a page in a reference string.
pub type PageId = u64;

/// Index of a slot in a frame set.
pub type FrameId = usize;

/// Index of a memory block in the allocator's input list.
pub type BlockId = usize;

/// Process id used by the CPU scheduler.
pub type Pid = u32;
