//! Core error types for MemViz.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid memory address
    #[error("Invalid memory address '{input}': {reason}")]
    InvalidAddress {
        /// Raw input that failed to parse
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Invalid ID format
    #[error("Invalid ID: {reason}")]
    InvalidId {
        /// Why it was rejected
        reason: String,
    },

    /// Invalid timestamp
    #[error("Invalid timestamp: {reason}")]
    InvalidTimestamp {
        /// Why it was rejected
        reason: String,
    },

    /// Parse error
    #[error("Parse error: {message}")]
    ParseError {
        /// Parser message
        message: String,
    },

    /// Validation error
    #[error("Validation failed for {field}: {reason}")]
    Validation {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Not found
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity
        kind: String,
        /// Identifier that was looked up
        id: String,
    },

    /// Internal error (for unexpected errors)
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl CoreError {
    /// Shorthand for a validation failure
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::NotFound {
            kind: "Replay".to_string(),
            id: "replay_123".to_string(),
        };
        assert_eq!(format!("{}", err), "Replay not found: replay_123");

        let err = CoreError::validation("language", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Validation failed for language: must not be empty"
        );
    }

    #[test]
    fn test_invalid_address_error() {
        let err = CoreError::InvalidAddress {
            input: "7FFF".to_string(),
            reason: "missing 0x prefix".to_string(),
        };
        let s = format!("{}", err);
        assert!(s.contains("7FFF"));
        assert!(s.contains("missing 0x prefix"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::ParseError { .. }));
    }

    #[test]
    fn test_error_equality() {
        let err1 = CoreError::validation("a", "b");
        let err2 = CoreError::validation("a", "b");
        assert_eq!(err1, err2);

        let err3 = CoreError::Internal {
            message: "boom".to_string(),
        };
        assert_ne!(err1, err3);
    }
}
