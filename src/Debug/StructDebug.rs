use std::fmt;

use crate::Ring::ByteRing;

/// Debug function for ByteRing
///
/// Shows the configuration and, when the lock is free, the cursor state and
/// storage kind. A ring whose lock is held elsewhere prints `<locked>` rather
/// than blocking the formatter.
pub fn debug_byte_ring(ring: &ByteRing, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut dbg = f.debug_struct("ByteRing");
    dbg.field("config", &ring.config);

    match ring.state.try_lock() {
        Some(state) => {
            dbg.field("backing", &state.storage.as_ref().map(|s| s.kind()))
                .field("cursors", &state.cursors);
        }
        None => {
            dbg.field("state", &"<locked>");
        }
    }

    dbg.finish()
}

/// Debug function for MirroredRegion
///
/// Safely displays the mapping's location without dereferencing it
#[cfg(unix)]
pub fn debug_mirrored_region(
    region: &crate::Core::MirroredRegion,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct("MirroredRegion")
        .field("base", &format_args!("0x{:x}", region.base_addr()))
        .field("capacity", &region.capacity())
        .field("handle", &region.raw_handle())
        .finish()
}
