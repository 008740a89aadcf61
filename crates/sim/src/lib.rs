pub mod allocator;
pub mod frame;
pub mod paging;
pub mod parse;
pub mod replacer;
pub mod scheduler;
mod typedef;

pub use ossim_error::Error;
pub use typedef::{BlockId, FrameId, PageId, Pid};

pub type Result<T> = std::result::Result<T, ossim_error::Error>;
