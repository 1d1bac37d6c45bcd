// Module naming follows project convention (Core = OS plumbing, Ring = the byte pipe)
#[allow(non_snake_case)]
pub mod Core;

#[allow(non_snake_case)]
pub mod Ring;

#[allow(non_snake_case)]
mod Debug {
    pub mod StructDebug;
}

pub mod error;
pub mod ffi;

pub use error::{ErrorKind, RingError};
pub use Ring::{BackingKind, Backpressure, ByteRing, RingBuilder, RingConfig}; // re-export for stable path
