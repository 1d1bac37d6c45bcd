// Read/write cursor arithmetic. Callers hold the ring's lock.

/// Positions of the next byte to read and to write, plus the empty flag.
///
/// When `read == write` the cursors alone cannot tell an empty ring from a
/// full one; `empty` is authoritative in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursors {
    read: usize,
    write: usize,
    capacity: usize,
    empty: bool,
}

impl Cursors {
    /// Sentinel state of a ring with no storage.
    pub const fn unmapped() -> Self {
        Self {
            read: 0,
            write: 0,
            capacity: 0,
            empty: true,
        }
    }

    pub const fn new(capacity: usize) -> Self {
        Self {
            read: 0,
            write: 0,
            capacity,
            empty: true,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn read_pos(&self) -> usize {
        self.read
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Bytes that can be written without passing the reader.
    pub fn free_space(&self) -> usize {
        if self.empty {
            return self.capacity;
        }
        (self.read + self.capacity - self.write) % self.capacity
    }

    /// Bytes written but not yet read.
    pub fn available(&self) -> usize {
        if self.empty {
            return 0;
        }
        match (self.write + self.capacity - self.read) % self.capacity {
            0 => self.capacity,
            n => n,
        }
    }

    /// Whether a write of `len` bytes is accepted in full.
    #[inline]
    pub fn admits(&self, len: usize) -> bool {
        len <= self.free_space()
    }

    pub fn advance_read(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        if n == 0 {
            return;
        }
        self.read = (self.read + n) % self.capacity;
        if self.read == self.write {
            self.empty = true;
        }
    }

    pub fn advance_write(&mut self, n: usize) {
        debug_assert!(n <= self.free_space());
        if n == 0 {
            return;
        }
        self.write = (self.write + n) % self.capacity;
        self.empty = false;
    }
}

impl Default for Cursors {
    fn default() -> Self {
        Self::unmapped()
    }
}
