mod builder;
mod cursor;
mod debug;

pub use builder::{BackingKind, Backpressure, RingBuilder, RingConfig};
pub use cursor::Cursors;

pub mod Buffer;
pub mod Buffer_impl;

pub use Buffer::ByteRing; // re-export for stable path
