use std::time::Duration;

use super::ByteRing;
use crate::error::RingError;

/// How the ring's storage is laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackingKind {
    /// One backing store mapped twice; every transfer is a single copy.
    #[default]
    Mirrored,
    /// Plain heap buffer; transfers across the wrap point are split in two.
    SplitCopy,
    /// Mirrored when the platform allows it, otherwise split copy.
    Auto,
}

/// What a write does when the ring lacks room for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backpressure {
    /// Reject immediately with a zero return.
    #[default]
    FailFast,
    /// Wait up to the given duration for readers to make room, then reject.
    BlockFor(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingConfig {
    pub backing: BackingKind,
    pub backpressure: Backpressure,
}

#[derive(Debug)]
pub struct RingBuilder {
    capacity: usize,
    config: RingConfig,
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self {
            capacity: 1024 * 1024, // 1MB default
            config: RingConfig::default(),
        }
    }
}

impl RingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested capacity in bytes; rounded up to whole pages on build.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_backing(mut self, backing: BackingKind) -> Self {
        self.config.backing = backing;
        self
    }

    pub fn with_backpressure(mut self, backpressure: Backpressure) -> Self {
        self.config.backpressure = backpressure;
        self
    }

    pub fn config(&self) -> RingConfig {
        self.config
    }

    pub fn build(self) -> Result<ByteRing, RingError> {
        let ring = ByteRing::with_config(self.config);
        ring.initialize(self.capacity)?;
        Ok(ring)
    }
}
