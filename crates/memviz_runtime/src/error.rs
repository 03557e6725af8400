//! Service error taxonomy.

use memviz_replay::{Operation, ReplayError, ReplayStatus};
use memviz_storage::StoreError;
use serde::{Deserialize, Serialize};

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stable, machine-readable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unknown replay ID
    NotFound,
    /// Operation not legal in the current status
    InvalidTransition,
    /// Start with no steps
    EmptySequence,
    /// Step backward at index 0
    AtFirstStep,
    /// Index outside the sequence
    IndexOutOfRange,
    /// Append after completion
    SequenceClosed,
    /// Repository could not save or update
    PersistenceFailure,
    /// Rejected input
    Validation,
    /// Anything else
    Unexpected,
}

impl ErrorKind {
    /// Upper-snake code
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::EmptySequence => "EMPTY_SEQUENCE",
            Self::AtFirstStep => "AT_FIRST_STEP",
            Self::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            Self::SequenceClosed => "SEQUENCE_CLOSED",
            Self::PersistenceFailure => "PERSISTENCE_FAILURE",
            Self::Validation => "VALIDATION",
            Self::Unexpected => "UNEXPECTED",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Service error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Unknown replay ID
    #[error("Replay not found: {id}")]
    NotFound {
        /// Replay ID
        id: String,
    },

    /// Operation not legal in the current status
    #[error("Cannot {attempted} while replay is {from}")]
    InvalidTransition {
        /// Status at the time of the call
        from: ReplayStatus,
        /// Refused operation
        attempted: Operation,
    },

    /// Start with no steps
    #[error("Cannot start a replay with no steps")]
    EmptySequence,

    /// Step backward at index 0
    #[error("Already at the first step")]
    AtFirstStep,

    /// Index outside the sequence
    #[error("Step index {index} is out of range for {total} steps")]
    IndexOutOfRange {
        /// Requested index
        index: i64,
        /// Number of steps
        total: usize,
    },

    /// Append after completion
    #[error("Cannot add steps to a completed replay")]
    SequenceClosed,

    /// Repository could not save or update
    #[error("Failed to persist replay {id}: {reason}")]
    PersistenceFailure {
        /// Replay ID
        id: String,
        /// Cause
        reason: String,
    },

    /// Rejected input
    #[error("Validation failed: {reason}")]
    Validation {
        /// What was wrong
        reason: String,
    },

    /// Anything else
    #[error("Unexpected error: {reason}")]
    Unexpected {
        /// Cause
        reason: String,
    },
}

impl ServiceError {
    /// Machine-readable category
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::EmptySequence => ErrorKind::EmptySequence,
            Self::AtFirstStep => ErrorKind::AtFirstStep,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::SequenceClosed => ErrorKind::SequenceClosed,
            Self::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Build a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Whether the caller broke a replay precondition
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidTransition
                | ErrorKind::EmptySequence
                | ErrorKind::AtFirstStep
                | ErrorKind::IndexOutOfRange
                | ErrorKind::SequenceClosed
        )
    }

    /// Map a failure to load a replay
    pub(crate) fn from_load(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            other => Self::Unexpected {
                reason: other.to_string(),
            },
        }
    }

    /// Map a failure to save, update or delete a replay
    pub(crate) fn from_persist(id: impl std::fmt::Display, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => Self::NotFound { id },
            other => Self::PersistenceFailure {
                id: id.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<ReplayError> for ServiceError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::InvalidTransition { from, attempted } => {
                Self::InvalidTransition { from, attempted }
            }
            ReplayError::EmptySequence => Self::EmptySequence,
            ReplayError::AtFirstStep => Self::AtFirstStep,
            ReplayError::IndexOutOfRange { index, total } => Self::IndexOutOfRange { index, total },
            ReplayError::SequenceClosed => Self::SequenceClosed,
            ReplayError::Validation { reason } => Self::Validation { reason },
        }
    }
}
