//! Stack frames.

use crate::error::{require_name, MemoryError, MemoryResult};
use crate::variable::Variable;
use indexmap::IndexMap;
use memviz_core::{FrameId, MemoryAddress, Timestamp};
use serde::{Deserialize, Serialize};

/// One function activation on the call stack
///
/// Variables keep declaration order and are unique by name. `size` is kept
/// equal to the sum of the current variables' sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FrameRecord", into = "FrameRecord")]
pub struct StackFrame {
    id: FrameId,
    function_name: String,
    base_address: MemoryAddress,
    line: u32,
    size: u64,
    variables: IndexMap<String, Variable>,
    created_at: Timestamp,
}

/// Serialized form: variables as a list, size recomputed on load
#[derive(Serialize, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    id: FrameId,
    function_name: String,
    base_address: MemoryAddress,
    line: u32,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    variables: Vec<Variable>,
    #[serde(default = "Timestamp::now")]
    created_at: Timestamp,
}

impl TryFrom<FrameRecord> for StackFrame {
    type Error = MemoryError;

    fn try_from(record: FrameRecord) -> Result<Self, Self::Error> {
        require_name(&record.function_name, "Function")?;
        let mut frame = StackFrame {
            id: record.id,
            function_name: record.function_name,
            base_address: record.base_address,
            line: record.line,
            size: 0,
            variables: IndexMap::with_capacity(record.variables.len()),
            created_at: record.created_at,
        };
        for variable in record.variables {
            frame.add_variable(variable)?;
        }
        Ok(frame)
    }
}

impl From<StackFrame> for FrameRecord {
    fn from(frame: StackFrame) -> Self {
        Self {
            id: frame.id,
            function_name: frame.function_name,
            base_address: frame.base_address,
            line: frame.line,
            size: frame.size,
            variables: frame.variables.into_values().collect(),
            created_at: frame.created_at,
        }
    }
}

impl StackFrame {
    /// Create an empty frame
    ///
    /// # Errors
    ///
    /// Returns error if the function name is blank
    pub fn new(
        function_name: impl Into<String>,
        base_address: MemoryAddress,
        line: u32,
    ) -> MemoryResult<Self> {
        let function_name = function_name.into();
        require_name(&function_name, "Function")?;

        Ok(Self {
            id: FrameId::new(),
            function_name,
            base_address,
            line,
            size: 0,
            variables: IndexMap::new(),
            created_at: Timestamp::now(),
        })
    }

    /// Add a variable
    ///
    /// # Errors
    ///
    /// Returns error if a variable with the same name is already in the frame,
    /// or if the frame size would no longer fit in 64 bits
    pub fn add_variable(&mut self, variable: Variable) -> MemoryResult<()> {
        if self.variables.contains_key(variable.name()) {
            return Err(MemoryError::DuplicateVariable {
                name: variable.name().to_string(),
                frame: self.function_name.clone(),
            });
        }
        self.size = self
            .size
            .checked_add(variable.size())
            .ok_or_else(|| MemoryError::SizeOverflow {
                frame: self.function_name.clone(),
            })?;
        self.variables.insert(variable.name().to_string(), variable);
        Ok(())
    }

    /// Builder form of [`add_variable`](Self::add_variable)
    ///
    /// # Errors
    ///
    /// Returns error on a duplicate name
    pub fn with_variable(mut self, variable: Variable) -> MemoryResult<Self> {
        self.add_variable(variable)?;
        Ok(self)
    }

    /// Remove a variable by name
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        let removed = self.variables.shift_remove(name)?;
        self.size -= removed.size();
        Some(removed)
    }

    /// Look up a variable by name
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Mutable lookup, for assignments while the frame is being captured
    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.get_mut(name)
    }

    /// Variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Move the frame to another source line
    pub fn update_line(&mut self, line: u32) {
        self.line = line;
    }

    /// Frame ID
    #[must_use]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Function name
    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Base address
    #[must_use]
    pub fn base_address(&self) -> MemoryAddress {
        self.base_address
    }

    /// Current source line
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Sum of variable sizes in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of variables
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// When the frame was pushed
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
