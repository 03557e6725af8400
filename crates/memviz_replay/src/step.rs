//! Simulation steps.
//!
//! A step is one frozen snapshot of program memory plus the source
//! operation that produced it. Steps are assembled with
//! [`SimulationStepBuilder`] and never change afterwards.

use crate::error::{ReplayError, ReplayResult};
use memviz_core::{StepId, Timestamp};
use memviz_memory::{HeapObject, OperationKind, Pointer, StackFrame};
use serde::{Deserialize, Serialize};

/// One captured point in a program's execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    #[serde(default)]
    id: StepId,
    step_number: u32,
    line: u32,
    code_line: String,
    operation: OperationKind,
    #[serde(default)]
    description: String,
    #[serde(default = "Timestamp::now")]
    created_at: Timestamp,
    #[serde(default)]
    frames: Vec<StackFrame>,
    #[serde(default)]
    heap: Vec<HeapObject>,
    #[serde(default)]
    pointers: Vec<Pointer>,
}

impl SimulationStep {
    /// Start building a step
    #[must_use]
    pub fn builder(
        step_number: u32,
        line: u32,
        code_line: impl Into<String>,
        operation: OperationKind,
    ) -> SimulationStepBuilder {
        SimulationStepBuilder::new(step_number, line, code_line, operation)
    }

    /// Check the fields a deserialized step could get wrong
    ///
    /// # Errors
    ///
    /// Returns error if the source line text is blank
    pub fn validate(&self) -> ReplayResult<()> {
        if self.code_line.trim().is_empty() {
            return Err(ReplayError::validation(format!(
                "step {} has an empty source line",
                self.step_number
            )));
        }
        Ok(())
    }

    /// Step ID
    #[must_use]
    pub fn id(&self) -> StepId {
        self.id
    }

    /// Step number
    #[must_use]
    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    /// Source line number
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Source line text
    #[must_use]
    pub fn code_line(&self) -> &str {
        &self.code_line
    }

    /// Operation that produced the step
    #[must_use]
    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When the step was captured
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Stack frames, outermost first
    #[must_use]
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Heap objects
    #[must_use]
    pub fn heap(&self) -> &[HeapObject] {
        &self.heap
    }

    /// Pointers
    #[must_use]
    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }
}

/// Builder for [`SimulationStep`]
#[derive(Debug, Clone)]
pub struct SimulationStepBuilder {
    step: SimulationStep,
}

impl SimulationStepBuilder {
    /// Create a builder with empty snapshot collections
    #[must_use]
    pub fn new(
        step_number: u32,
        line: u32,
        code_line: impl Into<String>,
        operation: OperationKind,
    ) -> Self {
        Self {
            step: SimulationStep {
                id: StepId::new(),
                step_number,
                line,
                code_line: code_line.into(),
                operation,
                description: String::new(),
                created_at: Timestamp::now(),
                frames: Vec::new(),
                heap: Vec::new(),
                pointers: Vec::new(),
            },
        }
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.step.description = description.into();
        self
    }

    /// Add a stack frame
    #[must_use]
    pub fn frame(mut self, frame: StackFrame) -> Self {
        self.step.frames.push(frame);
        self
    }

    /// Add a heap object
    #[must_use]
    pub fn heap_object(mut self, object: HeapObject) -> Self {
        self.step.heap.push(object);
        self
    }

    /// Add a pointer
    #[must_use]
    pub fn pointer(mut self, pointer: Pointer) -> Self {
        self.step.pointers.push(pointer);
        self
    }

    /// Freeze the step
    ///
    /// # Errors
    ///
    /// Returns error if the source line text is blank
    pub fn build(self) -> ReplayResult<SimulationStep> {
        self.step.validate()?;
        Ok(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_core::MemoryAddress;
    use memviz_memory::{ValueKind, Variable};

    #[test]
    fn test_build_step_with_snapshot() {
        let frame = StackFrame::new("main", MemoryAddress::from_u64(0x7FFF0000), 2)
            .unwrap()
            .with_variable(
                Variable::new("x", ValueKind::Integer, MemoryAddress::from_u64(0x7FFEFFF8), 4)
                    .unwrap()
                    .with_value("5"),
            )
            .unwrap();
        let obj = HeapObject::new("buf", ValueKind::Array, MemoryAddress::from_u64(0x1000), 32)
            .unwrap();
        let ptr = Pointer::new(
            "p",
            MemoryAddress::from_u64(0x7FFEFFF0),
            MemoryAddress::from_u64(0x1000),
        )
        .unwrap();

        let step = SimulationStep::builder(0, 2, "int x = 5;", OperationKind::Declaration)
            .description("declare x")
            .frame(frame)
            .heap_object(obj)
            .pointer(ptr)
            .build()
            .unwrap();

        assert_eq!(step.step_number(), 0);
        assert_eq!(step.line(), 2);
        assert_eq!(step.code_line(), "int x = 5;");
        assert_eq!(step.description(), "declare x");
        assert_eq!(step.frames().len(), 1);
        assert_eq!(step.heap().len(), 1);
        assert_eq!(step.pointers().len(), 1);
        assert_eq!(step.frames()[0].variable("x").unwrap().value(), Some("5"));
    }

    #[test]
    fn test_blank_code_line_rejected() {
        let result = SimulationStep::builder(0, 1, "   ", OperationKind::Assignment).build();
        assert!(matches!(result, Err(ReplayError::Validation { .. })));
    }

    #[test]
    fn test_step_json_defaults() {
        let step = SimulationStep::builder(3, 7, "free(p);", OperationKind::Deallocation)
            .build()
            .unwrap();
        let mut json = serde_json::to_value(&step).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("frames");
        obj.remove("description");

        let back: SimulationStep = serde_json::from_value(json).unwrap();
        assert!(back.frames().is_empty());
        assert_eq!(back.description(), "");
        assert_eq!(back.step_number(), 3);
    }
}
