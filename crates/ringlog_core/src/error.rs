//! Error types for ring log operations.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Result type for ring log operations.
pub type RingResult<T> = Result<T, RingError>;

/// Errors that can occur while operating on a log device.
///
/// None of these are fatal: after any error the device remains valid for
/// subsequent operations, and no shared state has been partially mutated.
#[derive(Debug, Error)]
pub enum RingError {
    /// Growing pending or entry storage failed.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// A seek addressed an entry or offset outside the held data.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// Waiting for the device gate was cancelled by an interrupt.
    ///
    /// Nothing was touched; the same call can be retried.
    #[error("interrupted while waiting for the device gate")]
    Interrupted,

    /// The session cursor predates an eviction.
    #[error("stale cursor: positioned at generation {cursor_generation}, device is at {device_generation}")]
    StaleCursor {
        /// Eviction generation observed when the cursor was positioned.
        cursor_generation: u64,
        /// Current eviction generation of the device.
        device_generation: u64,
    },

    /// The device configuration was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl RingError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true if the failed call can simply be issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Interrupted | Self::OutOfMemory(_))
    }
}

impl From<RingError> for io::Error {
    fn from(err: RingError) -> Self {
        let kind = match &err {
            RingError::OutOfMemory(_) => io::ErrorKind::OutOfMemory,
            RingError::InvalidArgument { .. } | RingError::InvalidConfig { .. } => {
                io::ErrorKind::InvalidInput
            }
            RingError::Interrupted => io::ErrorKind::Interrupted,
            RingError::StaleCursor { .. } => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_reserve_failure_maps_to_out_of_memory() {
        let mut buf: Vec<u8> = Vec::new();
        let err = buf.try_reserve(usize::MAX).unwrap_err();
        let err = RingError::from(err);
        assert!(matches!(err, RingError::OutOfMemory(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn io_error_kinds() {
        let io_err: io::Error = RingError::Interrupted.into();
        assert_eq!(io_err.kind(), io::ErrorKind::Interrupted);

        let io_err: io::Error = RingError::invalid_argument("entry 5").into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);

        let io_err: io::Error = RingError::StaleCursor {
            cursor_generation: 1,
            device_generation: 2,
        }
        .into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn display_messages() {
        let err = RingError::invalid_argument("entry index 5 out of range");
        assert_eq!(
            err.to_string(),
            "invalid argument: entry index 5 out of range"
        );
        assert!(!err.is_retryable());
    }
}
