// The byte ring shared between producer and consumer threads

use parking_lot::{Condvar, Mutex};

use super::builder::{BackingKind, RingConfig};
use super::cursor::Cursors;
use crate::error::{ErrorKind, RingError};
use crate::Core::SplitRegion;
#[cfg(unix)]
use crate::Core::MirroredRegion;

/// Storage behind an initialized ring.
pub(crate) enum Storage {
    #[cfg(unix)]
    Mirrored(MirroredRegion),
    Split(SplitRegion),
}

impl Storage {
    pub(crate) fn allocate(backing: BackingKind, requested: usize) -> Result<Self, RingError> {
        match backing {
            BackingKind::Mirrored => Self::mirrored(requested),
            BackingKind::SplitCopy => SplitRegion::allocate(requested).map(Storage::Split),
            BackingKind::Auto => match Self::mirrored(requested) {
                Ok(storage) => Ok(storage),
                Err(err) if err.kind() != ErrorKind::Configuration => {
                    tracing::warn!(
                        requested,
                        error = %err,
                        "mirrored mapping unavailable, falling back to split-copy storage"
                    );
                    SplitRegion::allocate(requested).map(Storage::Split)
                }
                Err(err) => Err(err),
            },
        }
    }

    #[cfg(unix)]
    fn mirrored(requested: usize) -> Result<Self, RingError> {
        MirroredRegion::allocate(requested).map(Storage::Mirrored)
    }

    #[cfg(not(unix))]
    fn mirrored(requested: usize) -> Result<Self, RingError> {
        crate::Core::page::page_aligned_capacity(requested)?;
        Err(RingError::Unsupported)
    }

    pub(crate) fn capacity(&self) -> usize {
        match self {
            #[cfg(unix)]
            Storage::Mirrored(region) => region.capacity(),
            Storage::Split(region) => region.capacity(),
        }
    }

    pub(crate) fn kind(&self) -> BackingKind {
        match self {
            #[cfg(unix)]
            Storage::Mirrored(_) => BackingKind::Mirrored,
            Storage::Split(_) => BackingKind::SplitCopy,
        }
    }

    /// Copy `src` into the ring at `pos`.
    #[inline]
    pub(crate) fn copy_in(&mut self, pos: usize, src: &[u8]) {
        match self {
            #[cfg(unix)]
            Storage::Mirrored(region) => region.window_mut(pos, src.len()).copy_from_slice(src),
            Storage::Split(region) => region.copy_in(pos, src),
        }
    }

    /// Copy `dst.len()` bytes out of the ring from `pos`.
    #[inline]
    pub(crate) fn copy_out(&self, pos: usize, dst: &mut [u8]) {
        match self {
            #[cfg(unix)]
            Storage::Mirrored(region) => dst.copy_from_slice(region.window(pos, dst.len())),
            Storage::Split(region) => region.copy_out(pos, dst),
        }
    }
}

/// Everything guarded by the ring's lock. `storage` is `None` before
/// initialization and after teardown.
pub(crate) struct RingState {
    pub(crate) storage: Option<Storage>,
    pub(crate) cursors: Cursors,
}

/// A bounded, thread-safe byte pipe.
///
/// ### Concurrency Design:
/// - Every operation serializes on one mutex; any number of producers and
///   consumers may share the ring.
/// - **Writers** never wait under [`Backpressure::FailFast`](super::Backpressure):
///   a write either fits entirely or returns `0`.
/// - **Readers** wait on `data_ready` while the ring is empty, then take
///   whatever is available up to the size of their buffer.
/// - Readers signal `space_ready` after consuming, which writers configured to
///   block wait on.
///
/// With [`BackingKind::Mirrored`] storage both the copy in and the copy out
/// are a single `memcpy`, even across the wrap point.
pub struct ByteRing {
    pub(crate) state: Mutex<RingState>,
    pub(crate) data_ready: Condvar,
    pub(crate) space_ready: Condvar,
    pub(crate) config: RingConfig,
}
