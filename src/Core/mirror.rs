// Mirror mapping: one backing store mapped twice, back to back
//
// raw buffer (fd):  [##########]
//                    |        |
//                    |<------>| capacity (n * page size)
//
// virtual buffer:   [##########|##########]
//                    ^          ^
//                    base       base + capacity
//                    \__ both halves map fd offset 0 __/

use std::ptr::{self, NonNull};
use std::slice;

use crate::error::RingError;
use crate::Core::SharedMemory::{AnonymousMemory, RawHandle};

/// A private, inaccessible address range. Unmapped on drop unless released.
struct Reservation {
    ptr: NonNull<u8>,
    len: usize,
}

impl Reservation {
    fn new(len: usize) -> Result<Self, RingError> {
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE;
        #[cfg(not(any(target_os = "linux", target_os = "android")))]
        let flags = libc::MAP_PRIVATE | libc::MAP_ANON;

        let ptr = unsafe { libc::mmap(ptr::null_mut(), len, libc::PROT_NONE, flags, -1, 0) };
        if ptr == libc::MAP_FAILED {
            return Err(RingError::mapping("address reservation", len));
        }

        match NonNull::new(ptr.cast::<u8>()) {
            Some(ptr) => Ok(Self { ptr, len }),
            None => Err(RingError::mapping("address reservation", len)),
        }
    }

    /// Hand ownership of the range to the caller without unmapping it.
    fn release(self) -> NonNull<u8> {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        // Removes the placeholder and any fixed mapping placed inside it.
        if unsafe { libc::munmap(self.ptr.as_ptr().cast(), self.len) } != 0 {
            tracing::warn!(
                len = self.len,
                error = %std::io::Error::last_os_error(),
                "failed to release address reservation"
            );
        }
    }
}

/// Map `memory` read-write and shared at offset 0 over `addr`, replacing what is there.
fn map_half(addr: *mut u8, memory: &AnonymousMemory, region: &'static str) -> Result<(), RingError> {
    let RawHandle::Fd(fd) = memory.raw_handle();
    let size = memory.size();

    let mapped = unsafe {
        libc::mmap(
            addr.cast(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED | libc::MAP_FIXED,
            fd,
            0,
        )
    };

    if mapped == libc::MAP_FAILED {
        return Err(RingError::mapping(region, size));
    }
    debug_assert_eq!(mapped.cast::<u8>(), addr);
    Ok(())
}

/// Backing store mapped into two contiguous halves of one address range.
///
/// Byte `p` of the store is visible at both `base + p` and
/// `base + capacity + p`, so any window of at most `capacity` bytes that
/// starts inside the first half is one linear slice, even when it runs past
/// the logical end of the ring.
pub struct MirroredRegion {
    base: NonNull<u8>,
    capacity: usize,
    // Dropped after both halves are unmapped.
    memory: AnonymousMemory,
}

// The region is plain memory; access is synchronized by the owner.
unsafe impl Send for MirroredRegion {}
unsafe impl Sync for MirroredRegion {}

impl MirroredRegion {
    /// Reserve `2 * memory.size()` bytes and map `memory` into both halves.
    ///
    /// On failure everything acquired so far, including `memory`, is released.
    pub fn new(memory: AnonymousMemory) -> Result<Self, RingError> {
        let capacity = memory.size();
        let span = capacity
            .checked_mul(2)
            .ok_or_else(|| RingError::Mapping {
                region: "address reservation",
                size: capacity,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "size overflow"),
            })?;

        let reservation = Reservation::new(span)?;
        let first = reservation.ptr.as_ptr();
        let second = unsafe { first.add(capacity) };

        map_half(first, &memory, "first half")?;
        map_half(second, &memory, "second half")?;

        Ok(Self {
            base: reservation.release(),
            capacity,
            memory,
        })
    }

    /// Convenience for allocating the backing store and mapping it in one step.
    pub fn allocate(requested: usize) -> Result<Self, RingError> {
        Self::new(AnonymousMemory::create(requested)?)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn raw_handle(&self) -> RawHandle {
        self.memory.raw_handle()
    }

    pub(crate) fn base_addr(&self) -> usize {
        self.base.as_ptr() as usize
    }

    fn check_window(&self, pos: usize, len: usize) {
        assert!(
            pos < self.capacity && len <= self.capacity,
            "window [{pos}, {pos}+{len}) outside mirrored region of capacity {}",
            self.capacity
        );
    }

    /// `len` bytes starting at logical offset `pos`.
    pub fn window(&self, pos: usize, len: usize) -> &[u8] {
        self.check_window(pos, len);
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(pos), len) }
    }

    /// Mutable `len` bytes starting at logical offset `pos`.
    ///
    /// `len <= capacity` keeps every byte of the slice on a distinct
    /// physical byte, so the slice never aliases itself.
    pub fn window_mut(&mut self, pos: usize, len: usize) -> &mut [u8] {
        self.check_window(pos, len);
        unsafe { slice::from_raw_parts_mut(self.base.as_ptr().add(pos), len) }
    }

    /// The whole doubled range, `2 * capacity` bytes.
    pub fn mirrored_view(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.capacity * 2) }
    }
}

impl Drop for MirroredRegion {
    fn drop(&mut self) {
        let first = self.base.as_ptr();
        let second = unsafe { first.add(self.capacity) };

        for (addr, half) in [(second, "second"), (first, "first")] {
            if unsafe { libc::munmap(addr.cast(), self.capacity) } != 0 {
                tracing::warn!(
                    half,
                    capacity = self.capacity,
                    error = %std::io::Error::last_os_error(),
                    "failed to unmap mirrored half"
                );
            }
        }
    }
}
