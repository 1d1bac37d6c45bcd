// Anonymous backing store for the mirrored ring
// Linux uses memfd_create; other Unix systems use shm_open + an immediate shm_unlink

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

use crate::error::RingError;
use crate::Core::page::page_aligned_capacity;

/// Platform-specific handle type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawHandle {
    /// Unix file descriptor
    Fd(RawFd),
}

/// An unnamed, memory-backed file sized to a whole number of pages.
///
/// The descriptor is owned, so it is closed on drop, including when a later
/// initialization step fails.
#[derive(Debug)]
pub struct AnonymousMemory {
    fd: OwnedFd,
    size: usize,
}

impl AnonymousMemory {
    /// Create a backing store of at least `requested` bytes.
    ///
    /// The real size is `requested` rounded up to the next page multiple.
    pub fn create(requested: usize) -> Result<Self, RingError> {
        let size = page_aligned_capacity(requested)?;

        let fd = open_anonymous().map_err(|source| RingError::Allocation {
            op: "create",
            size,
            source,
        })?;

        let len = libc::off_t::try_from(size).map_err(|_| RingError::Allocation {
            op: "resize",
            size,
            source: io::Error::new(io::ErrorKind::InvalidInput, "size exceeds off_t"),
        })?;

        // Set size
        if unsafe { libc::ftruncate(fd.as_raw_fd(), len) } != 0 {
            return Err(RingError::allocation("resize", size));
        }

        Ok(Self { fd, size })
    }

    /// Size of the backing store in bytes (always a page multiple).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn raw_handle(&self) -> RawHandle {
        RawHandle::Fd(self.fd.as_raw_fd())
    }
}

impl AsFd for AnonymousMemory {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

#[cfg(target_os = "linux")]
fn open_anonymous() -> io::Result<OwnedFd> {
    const NAME: &[u8] = b"dmxp_byte_ring\0";

    let fd = unsafe { libc::memfd_create(NAME.as_ptr().cast(), libc::MFD_CLOEXEC) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

#[cfg(all(unix, not(target_os = "linux")))]
fn open_anonymous() -> io::Result<OwnedFd> {
    use std::ffi::CString;
    use std::sync::atomic::{AtomicU64, Ordering};

    static NEXT_ID: AtomicU64 = AtomicU64::new(0);

    // The name only has to be unique for the instant between open and unlink.
    let name = format!(
        "/dmxp_ring_{}_{}",
        std::process::id(),
        NEXT_ID.fetch_add(1, Ordering::Relaxed)
    );
    let c_name = CString::new(name)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    let mode = 0o600 as libc::c_uint;
    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    let mode = 0o600 as libc::mode_t;

    let fd = unsafe {
        libc::shm_open(
            c_name.as_ptr(),
            libc::O_RDWR | libc::O_CREAT | libc::O_EXCL,
            mode,
        )
    };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };

    if unsafe { libc::shm_unlink(c_name.as_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(fd)
}
