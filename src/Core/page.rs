// Page-size discovery and size rounding

use crate::error::RingError;
use lazy_static::lazy_static;

/// Used when the platform refuses to report its page size.
const FALLBACK_PAGE_SIZE: usize = 4096;

lazy_static! {
    static ref PAGE_SIZE: usize = query_page_size();
}

#[cfg(unix)]
fn query_page_size() -> usize {
    let ps = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if ps <= 0 {
        tracing::warn!(
            fallback = FALLBACK_PAGE_SIZE,
            "sysconf(_SC_PAGESIZE) failed, assuming default page size"
        );
        return FALLBACK_PAGE_SIZE;
    }
    ps as usize
}

#[cfg(not(unix))]
fn query_page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

/// Mapping granularity of this platform, queried once and cached.
pub fn page_size() -> usize {
    *PAGE_SIZE
}

/// Largest capacity a ring may request.
///
/// The mirrored view spans twice the capacity and must stay addressable as an
/// `isize`, so the limit is half of `isize::MAX` rounded down to whole pages.
pub fn max_capacity() -> usize {
    let half = (isize::MAX as usize) / 2;
    half - half % page_size()
}

/// Smallest multiple of the page size that is `>= size`.
///
/// Returns `None` when the result would not fit in a `usize`.
pub fn round_to_pages(size: usize) -> Option<usize> {
    let page = page_size();
    let whole_pages = size / page + usize::from(size % page > 0);
    whole_pages.checked_mul(page)
}

/// Validates a requested ring capacity and rounds it up to whole pages.
pub fn page_aligned_capacity(requested: usize) -> Result<usize, RingError> {
    let max = max_capacity();
    if requested == 0 || requested > max {
        return Err(RingError::InvalidCapacity { requested, max });
    }
    round_to_pages(requested).ok_or(RingError::InvalidCapacity { requested, max })
}
