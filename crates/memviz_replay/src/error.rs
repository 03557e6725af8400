//! Replay errors.

use crate::status::{Operation, ReplayStatus};
use memviz_core::CoreError;
use memviz_memory::MemoryError;

/// Result type for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

/// A replay precondition that did not hold
///
/// Each variant is a distinct cause callers can branch on. A failed
/// operation never changes the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    /// Operation is not legal in the current status
    #[error("Cannot {attempted} while replay is {from}")]
    InvalidTransition {
        /// Status at the time of the call
        from: ReplayStatus,
        /// Operation that was refused
        attempted: Operation,
    },

    /// Start with no steps
    #[error("Cannot start a replay with no steps")]
    EmptySequence,

    /// Step backward at the first step
    #[error("Already at the first step")]
    AtFirstStep,

    /// Step index outside the sequence
    #[error("Step index {index} is out of range for {total} steps")]
    IndexOutOfRange {
        /// Requested index
        index: i64,
        /// Number of steps
        total: usize,
    },

    /// Append to a completed replay
    #[error("Cannot add steps to a completed replay")]
    SequenceClosed,

    /// Malformed input
    #[error("Invalid replay data: {reason}")]
    Validation {
        /// What was wrong
        reason: String,
    },
}

impl ReplayError {
    /// Build a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

impl From<MemoryError> for ReplayError {
    fn from(err: MemoryError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<ReplayError> for CoreError {
    fn from(err: ReplayError) -> Self {
        CoreError::Validation {
            field: "replay".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ReplayError::InvalidTransition {
            from: ReplayStatus::Completed,
            attempted: Operation::StepForward,
        };
        assert_eq!(err.to_string(), "Cannot step forward while replay is Completed");
        assert_eq!(ReplayError::AtFirstStep.to_string(), "Already at the first step");
        assert_eq!(
            ReplayError::IndexOutOfRange { index: 5, total: 3 }.to_string(),
            "Step index 5 is out of range for 3 steps"
        );
    }

    #[test]
    fn test_from_memory_error() {
        let err: ReplayError = MemoryError::InvalidSize { entity: "Variable" }.into();
        assert!(matches!(err, ReplayError::Validation { .. }));
    }
}
