//! Variables held in stack frames and heap object fields.

use crate::error::{require_name, require_size, MemoryError, MemoryResult};
use crate::kind::ValueKind;
use memviz_core::{MemoryAddress, VariableId};
use serde::{Deserialize, Serialize};

/// Rendering used for a pointer whose target was cleared
pub const NULL_POINTER_VALUE: &str = "nullptr";

/// A named value at an address
///
/// A variable is initialized exactly when it holds a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VariableRecord", into = "VariableRecord")]
pub struct Variable {
    id: VariableId,
    name: String,
    kind: ValueKind,
    address: MemoryAddress,
    size: u64,
    value: Option<String>,
    initialized: bool,
    points_to: Option<MemoryAddress>,
}

/// Serialized form; `initialized` is recomputed from `value` on load
#[derive(Serialize, Deserialize)]
struct VariableRecord {
    #[serde(default)]
    id: VariableId,
    name: String,
    kind: ValueKind,
    address: MemoryAddress,
    size: u64,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    initialized: bool,
    #[serde(default)]
    points_to: Option<MemoryAddress>,
}

impl TryFrom<VariableRecord> for Variable {
    type Error = MemoryError;

    fn try_from(record: VariableRecord) -> Result<Self, Self::Error> {
        require_name(&record.name, "Variable")?;
        require_size(record.size, "Variable")?;
        if record.points_to.is_some() && !record.kind.is_pointer() {
            return Err(MemoryError::NotAPointer { name: record.name });
        }

        Ok(Self {
            id: record.id,
            initialized: record.value.is_some(),
            name: record.name,
            kind: record.kind,
            address: record.address,
            size: record.size,
            value: record.value,
            points_to: record.points_to,
        })
    }
}

impl From<Variable> for VariableRecord {
    fn from(var: Variable) -> Self {
        Self {
            id: var.id,
            name: var.name,
            kind: var.kind,
            address: var.address,
            size: var.size,
            value: var.value,
            initialized: var.initialized,
            points_to: var.points_to,
        }
    }
}

impl Variable {
    /// Create an uninitialized variable
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank or the size is zero
    pub fn new(
        name: impl Into<String>,
        kind: ValueKind,
        address: MemoryAddress,
        size: u64,
    ) -> MemoryResult<Self> {
        let name = name.into();
        require_name(&name, "Variable")?;
        require_size(size, "Variable")?;

        Ok(Self {
            id: VariableId::new(),
            name,
            kind,
            address,
            size,
            value: None,
            initialized: false,
            points_to: None,
        })
    }

    /// Give the variable an initial value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.update_value(value);
        self
    }

    /// Assign a new value rendering
    pub fn update_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
        self.initialized = true;
    }

    /// Point this variable at `target`
    ///
    /// The value rendering becomes the target address.
    ///
    /// # Errors
    ///
    /// Returns error if the variable is not a pointer
    pub fn set_pointer_target(&mut self, target: MemoryAddress) -> MemoryResult<()> {
        if !self.kind.is_pointer() {
            return Err(MemoryError::NotAPointer {
                name: self.name.clone(),
            });
        }
        self.points_to = Some(target);
        self.update_value(target.to_string());
        Ok(())
    }

    /// Clear the pointer target, leaving a `nullptr` value
    pub fn clear_pointer_target(&mut self) {
        self.points_to = None;
        self.update_value(NULL_POINTER_VALUE);
    }

    /// Variable ID
    #[must_use]
    pub fn id(&self) -> VariableId {
        self.id
    }

    /// Name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type tag
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Address
    #[must_use]
    pub fn address(&self) -> MemoryAddress {
        self.address
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Current value rendering
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Whether a value was ever assigned
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pointer target, for pointer variables that have one
    #[must_use]
    pub fn points_to(&self) -> Option<MemoryAddress> {
        self.points_to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(v: u64) -> MemoryAddress {
        MemoryAddress::from_u64(v)
    }

    #[test]
    fn test_new_variable_is_uninitialized() {
        let var = Variable::new("x", ValueKind::Integer, addr(0x7FF0), 4).unwrap();
        assert_eq!(var.name(), "x");
        assert_eq!(var.size(), 4);
        assert!(!var.is_initialized());
        assert_eq!(var.value(), None);
        assert_eq!(var.points_to(), None);
    }

    #[test]
    fn test_new_rejects_blank_name_and_zero_size() {
        assert_eq!(
            Variable::new(" ", ValueKind::Integer, addr(0x10), 4),
            Err(MemoryError::EmptyName { entity: "Variable" })
        );
        assert_eq!(
            Variable::new("x", ValueKind::Integer, addr(0x10), 0),
            Err(MemoryError::InvalidSize { entity: "Variable" })
        );
    }

    #[test]
    fn test_update_value_marks_initialized() {
        let mut var = Variable::new("x", ValueKind::Integer, addr(0x10), 4).unwrap();
        var.update_value("42");
        assert!(var.is_initialized());
        assert_eq!(var.value(), Some("42"));

        let var = Variable::new("y", ValueKind::Integer, addr(0x18), 4)
            .unwrap()
            .with_value("7");
        assert!(var.is_initialized());
    }

    #[test]
    fn test_set_pointer_target() {
        let mut ptr = Variable::new("p", ValueKind::Pointer, addr(0x20), 8).unwrap();
        ptr.set_pointer_target(addr(0x1000)).unwrap();
        assert_eq!(ptr.points_to(), Some(addr(0x1000)));
        assert_eq!(ptr.value(), Some("0x1000"));
        assert!(ptr.is_initialized());

        ptr.clear_pointer_target();
        assert_eq!(ptr.points_to(), None);
        assert_eq!(ptr.value(), Some(NULL_POINTER_VALUE));
    }

    #[test]
    fn test_deserialize_rechecks_invariants() {
        let json = r#"{"name":"x","kind":"Integer","address":"0x10","size":4,"points_to":"0x20"}"#;
        assert!(serde_json::from_str::<Variable>(json).is_err());

        let json = r#"{"name":"","kind":"Integer","address":"0x10","size":4}"#;
        assert!(serde_json::from_str::<Variable>(json).is_err());

        let json = r#"{"name":"x","kind":"Integer","address":"0x10","size":0}"#;
        assert!(serde_json::from_str::<Variable>(json).is_err());

        let json = r#"{"name":"x","kind":"Integer","address":"0x10","size":4}"#;
        let var: Variable = serde_json::from_str(json).unwrap();
        assert!(!var.is_initialized());
    }

    #[test]
    fn test_initialized_follows_value_on_load() {
        let json = r#"{"name":"x","kind":"Integer","address":"0x10","size":4,"value":"7"}"#;
        let var: Variable = serde_json::from_str(json).unwrap();
        assert_eq!(var.value(), Some("7"));
        assert!(var.is_initialized());

        let json = r#"{"name":"x","kind":"Integer","address":"0x10","size":4,"initialized":true}"#;
        let var: Variable = serde_json::from_str(json).unwrap();
        assert!(!var.is_initialized());
    }

    #[test]
    fn test_serde_keeps_value_and_flag() {
        let var = Variable::new("x", ValueKind::Integer, addr(0x10), 4)
            .unwrap()
            .with_value("3");
        let back: Variable = serde_json::from_str(&serde_json::to_string(&var).unwrap()).unwrap();
        assert_eq!(back, var);
    }

    #[test]
    fn test_set_pointer_target_on_non_pointer_fails() {
        let mut var = Variable::new("x", ValueKind::Integer, addr(0x10), 4).unwrap();
        let result = var.set_pointer_target(addr(0x1000));
        assert_eq!(
            result,
            Err(MemoryError::NotAPointer {
                name: "x".to_string()
            })
        );
        assert!(!var.is_initialized());
        assert_eq!(var.points_to(), None);
    }
}
