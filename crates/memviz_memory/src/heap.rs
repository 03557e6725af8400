//! Heap objects.

use crate::error::{require_name, require_size, MemoryError, MemoryResult};
use crate::kind::ValueKind;
use crate::variable::Variable;
use indexmap::IndexMap;
use memviz_core::{HeapObjectId, MemoryAddress, Timestamp};
use serde::{Deserialize, Serialize};

/// A dynamically allocated object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HeapRecord", into = "HeapRecord")]
pub struct HeapObject {
    id: HeapObjectId,
    name: String,
    kind: ValueKind,
    address: MemoryAddress,
    size: u64,
    allocated: bool,
    allocated_at: Timestamp,
    deallocated_at: Option<Timestamp>,
    fields: IndexMap<String, Variable>,
}

/// Serialized form: fields as a list
#[derive(Serialize, Deserialize)]
struct HeapRecord {
    #[serde(default)]
    id: HeapObjectId,
    name: String,
    kind: ValueKind,
    address: MemoryAddress,
    size: u64,
    #[serde(default = "live")]
    allocated: bool,
    #[serde(default = "Timestamp::now")]
    allocated_at: Timestamp,
    #[serde(default)]
    deallocated_at: Option<Timestamp>,
    #[serde(default)]
    fields: Vec<Variable>,
}

fn live() -> bool {
    true
}

impl TryFrom<HeapRecord> for HeapObject {
    type Error = MemoryError;

    fn try_from(record: HeapRecord) -> Result<Self, Self::Error> {
        require_name(&record.name, "Heap object")?;
        require_size(record.size, "Heap object")?;

        let mut fields = IndexMap::with_capacity(record.fields.len());
        for field in record.fields {
            if fields.contains_key(field.name()) {
                return Err(MemoryError::DuplicateField {
                    name: field.name().to_string(),
                    object: record.name,
                });
            }
            fields.insert(field.name().to_string(), field);
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            kind: record.kind,
            address: record.address,
            size: record.size,
            allocated: record.allocated,
            allocated_at: record.allocated_at,
            deallocated_at: record.deallocated_at,
            fields,
        })
    }
}

impl From<HeapObject> for HeapRecord {
    fn from(object: HeapObject) -> Self {
        Self {
            id: object.id,
            name: object.name,
            kind: object.kind,
            address: object.address,
            size: object.size,
            allocated: object.allocated,
            allocated_at: object.allocated_at,
            deallocated_at: object.deallocated_at,
            fields: object.fields.into_values().collect(),
        }
    }
}

impl HeapObject {
    /// Record a fresh allocation
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
        require_name(&name, "Heap object")?;
        require_size(size, "Heap object")?;

        Ok(Self {
            id: HeapObjectId::new(),
            name,
            kind,
            address,
            size,
            allocated: true,
            allocated_at: Timestamp::now(),
            deallocated_at: None,
            fields: IndexMap::new(),
        })
    }

    /// Add a field
    ///
    /// # Errors
    ///
    /// Returns error if the object is deallocated or the field name is taken
    pub fn add_field(&mut self, field: Variable) -> MemoryResult<()> {
        if !self.allocated {
            return Err(MemoryError::Deallocated {
                name: self.name.clone(),
            });
        }
        if self.fields.contains_key(field.name()) {
            return Err(MemoryError::DuplicateField {
                name: field.name().to_string(),
                object: self.name.clone(),
            });
        }
        self.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    /// Builder form of [`add_field`](Self::add_field)
    ///
    /// # Errors
    ///
    /// Same as [`add_field`](Self::add_field)
    pub fn with_field(mut self, field: Variable) -> MemoryResult<Self> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Free the object
    ///
    /// # Errors
    ///
    /// Returns error if it was already freed
    pub fn deallocate(&mut self) -> MemoryResult<()> {
        if !self.allocated {
            return Err(MemoryError::AlreadyDeallocated {
                name: self.name.clone(),
            });
        }
        self.allocated = false;
        self.deallocated_at = Some(Timestamp::now());
        Ok(())
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Variable> {
        self.fields.get(name)
    }

    /// Fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = &Variable> {
        self.fields.values()
    }

    /// Object ID
    #[must_use]
    pub fn id(&self) -> HeapObjectId {
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

    /// Allocation size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the object is still live
    #[must_use]
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// Allocation time
    #[must_use]
    pub fn allocated_at(&self) -> Timestamp {
        self.allocated_at
    }

    /// Deallocation time, once freed
    #[must_use]
    pub fn deallocated_at(&self) -> Option<Timestamp> {
        self.deallocated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> HeapObject {
        HeapObject::new("node", ValueKind::Struct, MemoryAddress::from_u64(0x1000), 16).unwrap()
    }

    fn field(name: &str) -> Variable {
        Variable::new(name, ValueKind::Integer, MemoryAddress::from_u64(0x1000), 4).unwrap()
    }

    #[test]
    fn test_new_heap_object_is_allocated() {
        let obj = node();
        assert!(obj.is_allocated());
        assert!(obj.deallocated_at().is_none());
        assert_eq!(obj.size(), 16);
    }

    #[test]
    fn test_new_rejects_zero_size() {
        let result = HeapObject::new("node", ValueKind::Struct, MemoryAddress::NULL, 0);
        assert!(matches!(result, Err(MemoryError::InvalidSize { .. })));
    }

    #[test]
    fn test_fields_unique() {
        let mut obj = node().with_field(field("value")).unwrap();
        obj.add_field(field("next")).unwrap();
        assert!(matches!(
            obj.add_field(field("value")),
            Err(MemoryError::DuplicateField { .. })
        ));
        let names: Vec<_> = obj.fields().map(Variable::name).collect();
        assert_eq!(names, vec!["value", "next"]);
        assert!(obj.field("next").is_some());
    }

    #[test]
    fn test_deallocate_twice_fails() {
        let mut obj = node();
        obj.deallocate().unwrap();
        assert!(!obj.is_allocated());
        assert!(obj.deallocated_at().is_some());
        assert_eq!(
            obj.deallocate(),
            Err(MemoryError::AlreadyDeallocated {
                name: "node".to_string()
            })
        );
    }

    #[test]
    fn test_json_minimal_object_is_live() {
        let json = r#"{"name":"n","kind":"Struct","address":"0x1000","size":16,
            "fields":[{"name":"value","kind":"Integer","address":"0x1000","size":4}]}"#;
        let obj: HeapObject = serde_json::from_str(json).unwrap();
        assert!(obj.is_allocated());
        assert!(obj.field("value").is_some());

        let back: HeapObject = serde_json::from_str(&serde_json::to_string(&obj).unwrap()).unwrap();
        assert_eq!(back, obj);
    }

    #[test]
    fn test_no_fields_after_deallocate() {
        let mut obj = node();
        obj.deallocate().unwrap();
        assert!(matches!(
            obj.add_field(field("value")),
            Err(MemoryError::Deallocated { .. })
        ));
    }
}
