//! Pointer edges between addresses.

use crate::error::{require_name, MemoryResult};
use memviz_core::{MemoryAddress, PointerId};
use serde::{Deserialize, Serialize};

/// A reference from one address to another
///
/// Validity is derived from the target, so it can never disagree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    #[serde(default)]
    id: PointerId,
    name: String,
    source: MemoryAddress,
    target: MemoryAddress,
    #[serde(default)]
    label: Option<String>,
}

impl Pointer {
    /// Create a pointer
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank
    pub fn new(
        name: impl Into<String>,
        source: MemoryAddress,
        target: MemoryAddress,
    ) -> MemoryResult<Self> {
        let name = name.into();
        require_name(&name, "Pointer")?;

        Ok(Self {
            id: PointerId::new(),
            name,
            source,
            target,
            label: None,
        })
    }

    /// Attach a display label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Point at a new target
    pub fn retarget(&mut self, target: MemoryAddress) {
        self.target = target;
    }

    /// Null out the pointer
    pub fn invalidate(&mut self) {
        self.retarget(MemoryAddress::NULL);
    }

    /// Pointer ID
    #[must_use]
    pub fn id(&self) -> PointerId {
        self.id
    }

    /// Name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address holding the pointer
    #[must_use]
    pub fn source(&self) -> MemoryAddress {
        self.source
    }

    /// Address pointed at
    #[must_use]
    pub fn target(&self) -> MemoryAddress {
        self.target
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether the target is non-null
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.target.is_null()
    }
}
