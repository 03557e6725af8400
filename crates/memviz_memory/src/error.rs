//! Errors raised while building memory snapshots.

use memviz_core::CoreError;

/// Result type for memory model operations
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory model error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// A required name was empty or whitespace
    #[error("{entity} name cannot be empty")]
    EmptyName {
        /// Kind of record being built
        entity: &'static str,
    },

    /// Size must be positive
    #[error("{entity} size must be positive")]
    InvalidSize {
        /// Kind of record being built
        entity: &'static str,
    },

    /// Sum of variable sizes exceeds 64 bits
    #[error("Size of stack frame '{frame}' overflows")]
    SizeOverflow {
        /// Owning function
        frame: String,
    },

    /// Variable name already used in the frame
    #[error("Variable '{name}' already exists in stack frame '{frame}'")]
    DuplicateVariable {
        /// Variable name
        name: String,
        /// Owning function
        frame: String,
    },

    /// Field name already used in the heap object
    #[error("Field '{name}' already exists in heap object '{object}'")]
    DuplicateField {
        /// Field name
        name: String,
        /// Owning heap object
        object: String,
    },

    /// Pointer target set on a non-pointer variable
    #[error("Variable '{name}' is not a pointer")]
    NotAPointer {
        /// Variable name
        name: String,
    },

    /// Heap object was already freed
    #[error("Heap object '{name}' is already deallocated")]
    AlreadyDeallocated {
        /// Heap object name
        name: String,
    },

    /// Mutation of a freed heap object
    #[error("Cannot add fields to deallocated heap object '{name}'")]
    Deallocated {
        /// Heap object name
        name: String,
    },
}

impl From<MemoryError> for CoreError {
    fn from(err: MemoryError) -> Self {
        CoreError::Validation {
            field: "memory".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Reject empty or whitespace-only names
pub(crate) fn require_name(name: &str, entity: &'static str) -> MemoryResult<()> {
    if name.trim().is_empty() {
        return Err(MemoryError::EmptyName { entity });
    }
    Ok(())
}

/// Reject zero sizes
pub(crate) fn require_size(size: u64, entity: &'static str) -> MemoryResult<()> {
    if size == 0 {
        return Err(MemoryError::InvalidSize { entity });
    }
    Ok(())
}
