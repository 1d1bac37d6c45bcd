// Conventional single-mapping storage with explicit split copies at the wrap point.
// Selected through configuration where the mirror cannot be built.

use std::io;

use crate::error::RingError;
use crate::Core::page::page_aligned_capacity;

pub struct SplitRegion {
    data: Box<[u8]>,
}

impl SplitRegion {
    pub fn allocate(requested: usize) -> Result<Self, RingError> {
        let size = page_aligned_capacity(requested)?;

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|e| RingError::Allocation {
                op: "reserve",
                size,
                source: io::Error::new(io::ErrorKind::OutOfMemory, e),
            })?;
        data.resize(size, 0);

        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Copy `src` into the ring starting at `pos`, wrapping once if needed.
    pub fn copy_in(&mut self, pos: usize, src: &[u8]) {
        let head = src.len().min(self.capacity() - pos);
        let (front, back) = src.split_at(head);
        self.data[pos..pos + head].copy_from_slice(front);
        self.data[..back.len()].copy_from_slice(back);
    }

    /// Fill `dst` from the ring starting at `pos`, wrapping once if needed.
    pub fn copy_out(&self, pos: usize, dst: &mut [u8]) {
        let head = dst.len().min(self.capacity() - pos);
        let (front, back) = dst.split_at_mut(head);
        front.copy_from_slice(&self.data[pos..pos + head]);
        back.copy_from_slice(&self.data[..back.len()]);
    }
}
