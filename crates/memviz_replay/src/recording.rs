//! Recorded executions.
//!
//! A [`Recording`] is the JSON document a tracer writes: the program
//! source, its language, and the captured steps in order. It is the input
//! a replay is built from.

use crate::aggregate::ReplayAggregate;
use crate::error::ReplayResult;
use crate::step::SimulationStep;
use memviz_core::CoreResult;
use serde::{Deserialize, Serialize};

/// A recorded program execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    /// Source language tag
    pub language: String,
    /// Program source text
    pub source: String,
    /// Captured steps in execution order
    #[serde(default)]
    pub steps: Vec<SimulationStep>,
}

impl Recording {
    /// Create a recording with no steps
    #[must_use]
    pub fn new(source: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source: source.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: SimulationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse from JSON
    ///
    /// # Errors
    ///
    /// Returns error if the document is not a valid recording
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
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

    /// Build a fresh `Ready` replay holding these steps
    ///
    /// # Errors
    ///
    /// Returns error if the source or language is blank, or a step is
    /// malformed or out of order
    pub fn into_aggregate(self) -> ReplayResult<ReplayAggregate> {
        let mut aggregate = ReplayAggregate::new(self.source, self.language)?;
        for step in self.steps {
            aggregate.add_step(step)?;
        }
        tracing::debug!(
            replay_id = %aggregate.id(),
            steps = aggregate.total_steps(),
            "built replay from recording"
        );
        Ok(aggregate)
    }
}
