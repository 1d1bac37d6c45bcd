// C ABI over ByteRing.
//
// Null handles and null data pointers never crash: they are logged and the
// call returns a safe default (0 bytes, capacity 0, empty = true, init = false).

use crate::Ring::ByteRing;
use std::slice;

/// Handle to a ring instance (opaque pointer)
pub struct RingHandle {
    inner: ByteRing,
}

/// Create an unmapped ring with zero capacity.
///
/// # Returns
/// * Pointer to `RingHandle`; release it with `dmxp_ring_free`.
#[no_mangle]
pub extern "C" fn dmxp_ring_create() -> *mut RingHandle {
    Box::into_raw(Box::new(RingHandle {
        inner: ByteRing::new(),
    }))
}

/// Allocate and map the ring's storage.
///
/// # Arguments
/// * `handle` - Pointer to `RingHandle`.
/// * `size` - Requested capacity in bytes, rounded up to whole pages.
///
/// # Returns
/// * `true` on success. On failure the ring stays unmapped.
#[no_mangle]
pub extern "C" fn dmxp_ring_init(handle: *mut RingHandle, size: usize) -> bool {
    let Some(ring) = (unsafe { ring_ref(handle, "dmxp_ring_init") }) else {
        return false;
    };

    ring.initialize(size).is_ok()
}

/// Write `len` bytes from `src`, all or nothing.
///
/// # Returns
/// * `len` if the bytes were accepted, 0 otherwise.
#[no_mangle]
pub extern "C" fn dmxp_ring_write(handle: *mut RingHandle, src: *const u8, len: usize) -> usize {
    let Some(ring) = (unsafe { ring_ref(handle, "dmxp_ring_write") }) else {
        return 0;
    };
    if src.is_null() {
        tracing::error!(len, "dmxp_ring_write: source pointer is NULL");
        return 0;
    }

    let data = unsafe { slice::from_raw_parts(src, len) };
    match ring.write(data) {
        Ok(written) => written,
        Err(e) => {
            tracing::error!(len, error = %e, "dmxp_ring_write failed");
            0
        }
    }
}

/// Read up to `len` bytes into `dst`, blocking while the ring is empty.
///
/// # Returns
/// * Number of bytes copied into `dst`.
#[no_mangle]
pub extern "C" fn dmxp_ring_read(handle: *mut RingHandle, dst: *mut u8, len: usize) -> usize {
    let Some(ring) = (unsafe { ring_ref(handle, "dmxp_ring_read") }) else {
        return 0;
    };
    if dst.is_null() {
        tracing::error!(len, "dmxp_ring_read: target pointer is NULL");
        return 0;
    }

    let target = unsafe { slice::from_raw_parts_mut(dst, len) };
    match ring.read(target) {
        Ok(read) => read,
        Err(e) => {
            tracing::error!(len, error = %e, "dmxp_ring_read failed");
            0
        }
    }
}

/// Capacity in bytes, 0 for a NULL or unmapped ring.
#[no_mangle]
pub extern "C" fn dmxp_ring_size(handle: *mut RingHandle) -> usize {
    unsafe { ring_ref(handle, "dmxp_ring_size") }.map_or(0, ByteRing::capacity)
}

/// Empty state, `true` for a NULL or unmapped ring.
#[no_mangle]
pub extern "C" fn dmxp_ring_empty(handle: *mut RingHandle) -> bool {
    unsafe { ring_ref(handle, "dmxp_ring_empty") }.map_or(true, ByteRing::is_empty)
}

/// Release the ring's storage. The handle stays valid and may be initialized again.
#[no_mangle]
pub extern "C" fn dmxp_ring_teardown(handle: *mut RingHandle) {
    if let Some(ring) = unsafe { ring_ref(handle, "dmxp_ring_teardown") } {
        ring.teardown();
    }
}

/// Free a ring handle.
#[no_mangle]
pub extern "C" fn dmxp_ring_free(handle: *mut RingHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}

/// # Safety
/// `handle` must be NULL or a live pointer returned by `dmxp_ring_create`.
unsafe fn ring_ref<'a>(handle: *mut RingHandle, op: &str) -> Option<&'a ByteRing> {
    if handle.is_null() {
        tracing::error!(op, "ring handle is NULL");
        return None;
    }
    Some(&(*handle).inner)
}
