//! Read projection of a replay.

use crate::aggregate::ReplayAggregate;
use crate::status::ReplayStatus;
use crate::step::SimulationStep;
use memviz_core::{Duration, ReplayId, Timestamp};
use memviz_log::ReplayEvent;
use serde::{Deserialize, Serialize};

/// Snapshot of a replay handed to callers after each operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayView {
    /// Replay ID
    pub id: ReplayId,
    /// Source language tag
    pub language: String,
    /// Lifecycle status
    pub status: ReplayStatus,
    /// Current step index, `-1` when not positioned
    pub current_step_index: i64,
    /// Number of steps
    pub total_steps: usize,
    /// Full snapshot at the current step
    pub current_step: Option<SimulationStep>,
    /// Creation time
    pub created_at: Timestamp,
    /// Start time
    pub started_at: Option<Timestamp>,
    /// Completion time
    pub completed_at: Option<Timestamp>,
    /// Time between start and completion
    pub execution_time: Duration,
    /// Error message in the `Error` status
    pub error_message: Option<String>,
    /// Events drained by the operation that produced this view
    pub events: Vec<ReplayEvent>,
}

impl ReplayView {
    /// Project an aggregate, with no events
    #[must_use]
    pub fn of(aggregate: &ReplayAggregate) -> Self {
        Self {
            id: aggregate.id(),
            language: aggregate.language().to_string(),
            status: aggregate.status(),
            current_step_index: aggregate.current_step_index(),
            total_steps: aggregate.total_steps(),
            current_step: aggregate.current_step().cloned(),
            created_at: aggregate.created_at(),
            started_at: aggregate.started_at(),
            completed_at: aggregate.completed_at(),
            execution_time: aggregate.execution_time(),
            error_message: aggregate.error_message().map(str::to_string),
            events: Vec::new(),
        }
    }

    /// Attach drained events
    #[must_use]
    pub fn with_events(mut self, events: Vec<ReplayEvent>) -> Self {
        self.events = events;
        self
    }

    /// Whether forward progress has ended
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}

impl From<&ReplayAggregate> for ReplayView {
    fn from(aggregate: &ReplayAggregate) -> Self {
        Self::of(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_memory::OperationKind;

    #[test]
    fn test_view_of_running_replay() {
        let mut agg = ReplayAggregate::new("x = 1;", "c")
            .unwrap()
            .with_step(
                SimulationStep::builder(0, 1, "x = 1;", OperationKind::Assignment)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let events = agg.start().unwrap();

        let view = ReplayView::of(&agg).with_events(events);
        assert_eq!(view.status, ReplayStatus::Running);
        assert_eq!(view.current_step_index, 0);
        assert_eq!(view.total_steps, 1);
        assert_eq!(view.current_step.as_ref().unwrap().code_line(), "x = 1;");
        assert_eq!(view.events.len(), 1);
        assert!(!view.is_finished());
    }

    #[test]
    fn test_view_of_new_replay() {
        let agg = ReplayAggregate::new("x;", "c").unwrap();
        let view = ReplayView::from(&agg);
        assert_eq!(view.current_step_index, -1);
        assert!(view.current_step.is_none());
        assert!(view.events.is_empty());
    }
}
