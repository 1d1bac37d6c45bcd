use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::builder::{BackingKind, Backpressure, RingConfig};
use super::cursor::Cursors;
use super::Buffer::{ByteRing, RingState, Storage};
use crate::error::RingError;
use crate::Core::page::page_size;

/// How long a reader is prepared to wait for data.
#[derive(Clone, Copy)]
enum Wait {
    Never,
    Until(Instant),
    Forever,
}

impl Wait {
    fn after(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Wait::Until(deadline),
            None => Wait::Forever,
        }
    }
}

impl ByteRing {
    /// An unmapped ring with zero capacity. Call [`initialize`](Self::initialize)
    /// before transferring data.
    pub fn new() -> Self {
        Self::with_config(RingConfig::default())
    }

    pub fn with_config(config: RingConfig) -> Self {
        Self {
            state: Mutex::new(RingState {
                storage: None,
                cursors: Cursors::unmapped(),
            }),
            data_ready: Condvar::new(),
            space_ready: Condvar::new(),
            config,
        }
    }

    /// Allocate and map storage of at least `size` bytes.
    ///
    /// The real capacity is `size` rounded up to whole pages. Fails if the
    /// ring is already initialized; on any failure nothing stays allocated and
    /// the ring remains unmapped.
    pub fn initialize(&self, size: usize) -> Result<(), RingError> {
        let mut state = self.state.lock();

        if let Some(storage) = &state.storage {
            let err = RingError::AlreadyInitialized {
                capacity: storage.capacity(),
            };
            tracing::error!(requested = size, error = %err, "ring initialization rejected");
            return Err(err);
        }

        let storage = Storage::allocate(self.config.backing, size).map_err(|err| {
            tracing::error!(requested = size, error = %err, "ring initialization failed");
            err
        })?;

        let capacity = storage.capacity();
        tracing::info!(
            requested = size,
            capacity,
            page_size = page_size(),
            backing = ?storage.kind(),
            "ring initialized"
        );

        state.cursors = Cursors::new(capacity);
        state.storage = Some(storage);
        Ok(())
    }

    /// Write all of `src` or nothing.
    ///
    /// Returns `src.len()` when the bytes were accepted and `0` when they did
    /// not fit. Under [`Backpressure::BlockFor`] a write that does not fit
    /// waits for readers to make room until the deadline passes. A write larger
    /// than the capacity can never fit and is rejected at once.
    pub fn write(&self, src: &[u8]) -> Result<usize, RingError> {
        let len = src.len();
        let wait = match self.config.backpressure {
            Backpressure::FailFast => Wait::Never,
            Backpressure::BlockFor(timeout) => Wait::after(timeout),
        };

        let mut state = self.state.lock();

        loop {
            if state.storage.is_none() {
                return Err(RingError::NotInitialized);
            }
            if state.cursors.admits(len) {
                break;
            }

            let capacity = state.cursors.capacity();
            let free = state.cursors.free_space();
            if len > capacity {
                tracing::debug!(len, capacity, "write larger than ring capacity rejected");
                return Ok(0);
            }

            match wait {
                Wait::Until(deadline) if Instant::now() < deadline => {
                    self.space_ready.wait_until(&mut state, deadline);
                }
                Wait::Forever => self.space_ready.wait(&mut state),
                _ => {
                    tracing::debug!(
                        len,
                        free,
                        capacity,
                        "free space too small, write rejected; consider a larger ring"
                    );
                    return Ok(0);
                }
            }
        }

        let RingState { storage, cursors } = &mut *state;
        let Some(storage) = storage.as_mut() else {
            return Err(RingError::NotInitialized);
        };

        storage.copy_in(cursors.write_pos(), src);
        cursors.advance_write(len);
        drop(state);

        if len > 0 {
            self.data_ready.notify_one();
        }
        Ok(len)
    }

    /// Read up to `dst.len()` bytes, blocking while the ring is empty.
    ///
    /// Returns as soon as any data is available; the result may be shorter
    /// than `dst`. A zero-length `dst` returns `0` without waiting.
    pub fn read(&self, dst: &mut [u8]) -> Result<usize, RingError> {
        self.read_inner(dst, Wait::Forever)
    }

    /// Like [`read`](Self::read), but gives up and returns `0` once `timeout`
    /// has passed with the ring still empty.
    pub fn read_timeout(&self, dst: &mut [u8], timeout: Duration) -> Result<usize, RingError> {
        self.read_inner(dst, Wait::after(timeout))
    }

    /// Non-blocking read; `0` when the ring is empty.
    pub fn try_read(&self, dst: &mut [u8]) -> Result<usize, RingError> {
        self.read_inner(dst, Wait::Never)
    }

    fn read_inner(&self, dst: &mut [u8], wait: Wait) -> Result<usize, RingError> {
        let mut state = self.state.lock();

        loop {
            if state.storage.is_none() {
                return Err(RingError::NotInitialized);
            }
            if dst.is_empty() {
                return Ok(0);
            }
            if !state.cursors.is_empty() {
                break;
            }

            match wait {
                Wait::Forever => self.data_ready.wait(&mut state),
                Wait::Until(deadline) => {
                    if self.data_ready.wait_until(&mut state, deadline).timed_out()
                        && state.storage.is_some()
                        && state.cursors.is_empty()
                    {
                        tracing::debug!(len = dst.len(), "read timed out on empty ring");
                        return Ok(0);
                    }
                }
                Wait::Never => return Ok(0),
            }
        }

        let RingState { storage, cursors } = &mut *state;
        let Some(storage) = storage.as_ref() else {
            return Err(RingError::NotInitialized);
        };

        let bytes_read = cursors.available().min(dst.len());
        storage.copy_out(cursors.read_pos(), &mut dst[..bytes_read]);
        cursors.advance_read(bytes_read);
        let more_pending = !cursors.is_empty();
        drop(state);

        self.space_ready.notify_all();
        if more_pending {
            // Hand the remainder to the next waiting reader.
            self.data_ready.notify_one();
        }
        Ok(bytes_read)
    }

    /// Capacity in bytes; `0` before initialization and after teardown.
    pub fn capacity(&self) -> usize {
        self.state.lock().cursors.capacity()
    }

    /// `true` when no bytes are pending, including when uninitialized.
    pub fn is_empty(&self) -> bool {
        self.state.lock().cursors.is_empty()
    }

    /// Bytes written and not yet read.
    pub fn len(&self) -> usize {
        self.state.lock().cursors.available()
    }

    /// Bytes a write could currently add.
    pub fn free_space(&self) -> usize {
        self.state.lock().cursors.free_space()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().storage.is_some()
    }

    /// Storage layout in use, `None` when unmapped.
    pub fn backing(&self) -> Option<BackingKind> {
        self.state.lock().storage.as_ref().map(Storage::kind)
    }

    pub fn config(&self) -> RingConfig {
        self.config
    }

    /// Release the storage and return to the unmapped state.
    ///
    /// Safe to call on a ring that was never initialized and safe to call
    /// twice. Readers and blocked writers still waiting are woken and get
    /// [`RingError::NotInitialized`]. The ring may be initialized again
    /// afterwards.
    pub fn teardown(&self) {
        let storage = {
            let mut state = self.state.lock();
            state.cursors = Cursors::unmapped();
            state.storage.take()
        };

        if let Some(storage) = storage {
            tracing::debug!(
                capacity = storage.capacity(),
                backing = ?storage.kind(),
                "ring torn down"
            );
            drop(storage);
        }

        self.data_ready.notify_all();
        self.space_ready.notify_all();
    }
}

impl Default for ByteRing {
    fn default() -> Self {
        Self::new()
    }
}
