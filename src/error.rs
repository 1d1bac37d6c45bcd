// Error taxonomy for ring construction and use

use std::io;
use thiserror::Error;

/// Broad classification of a [`RingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments or the instance is in the wrong lifecycle state.
    Configuration,
    /// The anonymous backing store could not be created or sized.
    Allocation,
    /// The address-space reservation or one of the fixed mappings failed.
    Mapping,
}

#[derive(Debug, Error)]
pub enum RingError {
    #[error("requested capacity {requested} is out of range (1..={max} bytes)")]
    InvalidCapacity { requested: usize, max: usize },

    #[error("ring buffer is already initialized with {capacity} bytes")]
    AlreadyInitialized { capacity: usize },

    #[error("ring buffer is not initialized")]
    NotInitialized,

    #[error("failed to {op} backing store of {size} bytes: {source}")]
    Allocation {
        op: &'static str,
        size: usize,
        #[source]
        source: io::Error,
    },

    #[error("failed to map {region} ({size} bytes): {source}")]
    Mapping {
        region: &'static str,
        size: usize,
        #[source]
        source: io::Error,
    },

    #[error("mirrored mapping is not supported on this platform")]
    Unsupported,
}

impl RingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RingError::InvalidCapacity { .. }
            | RingError::AlreadyInitialized { .. }
            | RingError::NotInitialized => ErrorKind::Configuration,
            RingError::Allocation { .. } => ErrorKind::Allocation,
            RingError::Mapping { .. } | RingError::Unsupported => ErrorKind::Mapping,
        }
    }

    pub(crate) fn allocation(op: &'static str, size: usize) -> Self {
        RingError::Allocation {
            op,
            size,
            source: io::Error::last_os_error(),
        }
    }

    pub(crate) fn mapping(region: &'static str, size: usize) -> Self {
        RingError::Mapping {
            region,
            size,
            source: io::Error::last_os_error(),
        }
    }
}

impl From<RingError> for io::Error {
    fn from(err: RingError) -> Self {
        let kind = match &err {
            RingError::InvalidCapacity { .. } => io::ErrorKind::InvalidInput,
            RingError::AlreadyInitialized { .. } => io::ErrorKind::AlreadyExists,
            RingError::NotInitialized => io::ErrorKind::NotConnected,
            RingError::Allocation { source, .. } | RingError::Mapping { source, .. } => {
                source.kind()
            }
            RingError::Unsupported => io::ErrorKind::Unsupported,
        };
        io::Error::new(kind, err)
    }
}
