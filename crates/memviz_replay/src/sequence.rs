//! Ordered step sequence.

use crate::error::{ReplayError, ReplayResult};
use crate::step::SimulationStep;
use serde::{Deserialize, Serialize};

/// Append-only list of steps in replay order
///
/// Step numbers are strictly increasing. Steps are never removed or
/// reordered; the whole sequence is discarded with its replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepSequence {
    steps: Vec<SimulationStep>,
}

impl StepSequence {
    /// Create an empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    ///
    /// # Errors
    ///
    /// Returns error if the step is malformed or its number does not
    /// follow the last step's
    pub fn append(&mut self, step: SimulationStep) -> ReplayResult<()> {
        step.validate()?;
        if let Some(last) = self.steps.last() {
            if step.step_number() <= last.step_number() {
                return Err(ReplayError::validation(format!(
                    "step number {} does not follow {}",
                    step.step_number(),
                    last.step_number()
                )));
            }
        }
        self.steps.push(step);
        Ok(())
    }

    /// Step at `index`
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::IndexOutOfRange`] when `index < 0` or
    /// `index >= len`
    pub fn step_at(&self, index: i64) -> ReplayResult<&SimulationStep> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.steps.get(i))
            .ok_or(ReplayError::IndexOutOfRange {
                index,
                total: self.steps.len(),
            })
    }

    /// Step at `index`, if in range
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the last step
    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Steps in order
    pub fn iter(&self) -> std::slice::Iter<'_, SimulationStep> {
        self.steps.iter()
    }

    /// Steps as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[SimulationStep] {
        &self.steps
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a SimulationStep;
    type IntoIter = std::slice::Iter<'a, SimulationStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_memory::OperationKind;

    fn step(n: u32) -> SimulationStep {
        SimulationStep::builder(n, n + 1, format!("line {}", n), OperationKind::Assignment)
            .build()
            .unwrap()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut seq = StepSequence::new();
        for n in [0, 1, 5] {
            seq.append(step(n)).unwrap();
        }
        let numbers: Vec<_> = seq.iter().map(SimulationStep::step_number).collect();
        assert_eq!(numbers, vec![0, 1, 5]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.last_index(), Some(2));
    }

    #[test]
    fn test_append_rejects_non_increasing_numbers() {
        let mut seq = StepSequence::new();
        seq.append(step(2)).unwrap();
        assert!(matches!(seq.append(step(2)), Err(ReplayError::Validation { .. })));
        assert!(matches!(seq.append(step(1)), Err(ReplayError::Validation { .. })));
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn test_step_at_bounds() {
        let mut seq = StepSequence::new();
        seq.append(step(0)).unwrap();
        seq.append(step(1)).unwrap();

        assert_eq!(seq.step_at(1).unwrap().step_number(), 1);
        assert_eq!(
            seq.step_at(-1),
            Err(ReplayError::IndexOutOfRange { index: -1, total: 2 })
        );
        assert_eq!(
            seq.step_at(2),
            Err(ReplayError::IndexOutOfRange { index: 2, total: 2 })
        );
    }

    #[test]
    fn test_empty_sequence() {
        let seq = StepSequence::default();
        assert!(seq.is_empty());
        assert_eq!(seq.last_index(), None);
        assert!(seq.step_at(0).is_err());
    }
}
