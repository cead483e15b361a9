//! Error taxonomy for ring buffer and disruptor operations.

use thiserror::Error;

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised by the ring buffer family and the disruptor dispatch core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `ring_size` was not a power of two, or was smaller than the minimum.
    #[error("invalid ring size: {message}")]
    InvalidSize { message: String },

    /// The ring has never had a value written to it.
    #[error("ring buffer is empty")]
    Empty,

    /// The requested sequence has not been written yet.
    #[error("sequence not found: {sequence}")]
    SequenceNotFound { sequence: u64 },

    /// The requested sequence fell outside the live window and was overwritten.
    #[error("sequence {sequence} was overwritten")]
    SequenceOverwritten { sequence: u64 },

    /// The producer could not advance because a reader did not catch up in time.
    #[error("read cursor blocked the producer")]
    ReadCursorBlocked,

    /// A direct random-access operation was attempted on a type that forbids it.
    #[error("operation not allowed: {operation}")]
    OperationNotAllowed { operation: &'static str },
}

impl CoreError {
    pub fn invalid_size(message: impl Into<String>) -> Self {
        CoreError::InvalidSize { message: message.into() }
    }

    pub fn sequence_not_found(sequence: u64) -> Self {
        CoreError::SequenceNotFound { sequence }
    }

    pub fn sequence_overwritten(sequence: u64) -> Self {
        CoreError::SequenceOverwritten { sequence }
    }

    pub fn operation_not_allowed(operation: &'static str) -> Self {
        CoreError::OperationNotAllowed { operation }
    }

    /// Whether a caller can reasonably retry after waiting, as opposed to a
    /// configuration mistake that will never resolve on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::SequenceNotFound { .. } | CoreError::ReadCursorBlocked | CoreError::Empty
        )
    }

    /// Whether this error indicates the producer or a subscriber was made to wait.
    pub fn is_blocking(&self) -> bool {
        matches!(self, CoreError::ReadCursorBlocked | CoreError::SequenceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(CoreError::sequence_not_found(3).is_recoverable());
        assert!(CoreError::ReadCursorBlocked.is_recoverable());
        assert!(!CoreError::invalid_size("not a power of two").is_recoverable());
        assert!(!CoreError::operation_not_allowed("get").is_recoverable());
    }

    #[test]
    fn blocking_classification() {
        assert!(CoreError::ReadCursorBlocked.is_blocking());
        assert!(CoreError::sequence_not_found(0).is_blocking());
        assert!(!CoreError::Empty.is_blocking());
    }
}
