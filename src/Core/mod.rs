pub mod heap;
pub mod page;

#[cfg(unix)]
pub mod SharedMemory;
#[cfg(unix)]
pub mod mirror;

pub use heap::SplitRegion;
pub use page::{max_capacity, page_size, round_to_pages};

#[cfg(unix)]
pub use mirror::MirroredRegion;
#[cfg(unix)]
pub use SharedMemory::{AnonymousMemory, RawHandle};
