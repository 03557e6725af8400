//! Type tags for values and for the operations that produce steps.

use serde::{Deserialize, Serialize};

/// Kind of value stored at an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// `int`, `short`, `long`, ...
    Integer,
    /// `float`, `double`
    Float,
    /// `char`
    Character,
    /// `bool`
    Boolean,
    /// Pointer or reference
    Pointer,
    /// Fixed-size array
    Array,
    /// Struct or object
    Struct,
    /// String
    String,
    /// No value
    Void,
    /// Not known yet
    Unknown,
}

impl ValueKind {
    /// Whether values of this kind hold an address
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(self, Self::Pointer)
    }

    /// Whether values of this kind contain other values
    #[must_use]
    pub const fn is_aggregate(self) -> bool {
        matches!(self, Self::Array | Self::Struct)
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Character => "character",
            Self::Boolean => "boolean",
            Self::Pointer => "pointer",
            Self::Array => "array",
            Self::Struct => "struct",
            Self::String => "string",
            Self::Void => "void",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for ValueKind {
    fn default() -> Self {
        Self::Unknown
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of source operation that produced a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Variable declaration
    Declaration,
    /// Assignment to an existing variable
    Assignment,
    /// Heap allocation
    Allocation,
    /// Heap deallocation
    Deallocation,
    /// Call into a function, pushing a frame
    FunctionCall,
    /// Return from a function, popping a frame
    FunctionReturn,
    /// Assignment of a pointer target
    PointerAssignment,
    /// Indexing into an array
    ArrayAccess,
    /// Access to a struct member
    MemberAccess,
}

impl OperationKind {
    /// Name used in events and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Declaration => "Declaration",
            Self::Assignment => "Assignment",
            Self::Allocation => "Allocation",
            Self::Deallocation => "Deallocation",
            Self::FunctionCall => "FunctionCall",
            Self::FunctionReturn => "FunctionReturn",
            Self::PointerAssignment => "PointerAssignment",
            Self::ArrayAccess => "ArrayAccess",
            Self::MemberAccess => "MemberAccess",
        }
    }

    /// Whether the operation changes the heap
    #[must_use]
    pub const fn touches_heap(self) -> bool {
        matches!(self, Self::Allocation | Self::Deallocation)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
