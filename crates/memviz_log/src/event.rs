//! Replay lifecycle events.

use memviz_core::{Duration, EventId, ReplayId, Timestamp};
use memviz_memory::OperationKind;
use serde::{Deserialize, Serialize};

/// How a replay finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    /// Reached the last step
    Completed,
    /// Stopped by an error
    Error,
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "Completed"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// Event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReplayEventKind {
    /// The replay began running
    Started {
        /// Source language tag
        language: String,
        /// Number of steps in the sequence
        total_steps: usize,
    },
    /// The replay moved onto a step
    StepCompleted {
        /// Step number of the new current step
        step_number: u32,
        /// Source line number
        line: u32,
        /// Operation that produced the step
        operation: OperationKind,
        /// Human-readable description
        description: String,
        /// Stack frames in the snapshot
        frame_count: usize,
        /// Heap objects in the snapshot
        heap_count: usize,
        /// Pointers in the snapshot
        pointer_count: usize,
    },
    /// The replay finished, normally or with an error
    Completed {
        /// Final status
        status: CompletionStatus,
        /// Time between start and completion
        execution_time: Duration,
        /// Steps visited, `max(0, index + 1)`
        steps_executed: usize,
        /// Error message for [`CompletionStatus::Error`]
        error_message: Option<String>,
    },
}

impl ReplayEventKind {
    /// Short event name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "Started",
            Self::StepCompleted { .. } => "StepCompleted",
            Self::Completed { .. } => "Completed",
        }
    }
}

/// A lifecycle event raised by one replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    /// Unique event ID
    pub event_id: EventId,
    /// Replay that raised the event
    pub replay_id: ReplayId,
    /// Wall-clock time the event was raised
    pub occurred_at: Timestamp,
    /// Payload
    pub kind: ReplayEventKind,
}

impl ReplayEvent {
    /// Create an event stamped with a fresh ID and the current time
    #[must_use]
    pub fn new(replay_id: ReplayId, kind: ReplayEventKind) -> Self {
        Self {
            event_id: EventId::new(),
            replay_id,
            occurred_at: Timestamp::now(),
            kind,
        }
    }

    /// Event name
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Whether this event ends the replay
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ReplayEventKind::Completed { .. })
    }

    /// Whether this event reports a failure
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            ReplayEventKind::Completed {
                status: CompletionStatus::Error,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(status: CompletionStatus) -> ReplayEvent {
        ReplayEvent::new(
            ReplayId::new(),
            ReplayEventKind::Completed {
                status,
                execution_time: Duration::from_millis(5),
                steps_executed: 3,
                error_message: None,
            },
        )
    }

    #[test]
    fn test_event_creation() {
        let replay_id = ReplayId::new();
        let event = ReplayEvent::new(
            replay_id,
            ReplayEventKind::Started {
                language: "c".to_string(),
                total_steps: 3,
            },
        );
        assert_eq!(event.replay_id, replay_id);
        assert_eq!(event.name(), "Started");
        assert!(!event.is_terminal());
        assert!(!event.is_error());
    }

    #[test]
    fn test_completed_flags() {
        assert!(completed(CompletionStatus::Completed).is_terminal());
        assert!(!completed(CompletionStatus::Completed).is_error());
        assert!(completed(CompletionStatus::Error).is_error());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = ReplayEvent::new(
            ReplayId::new(),
            ReplayEventKind::StepCompleted {
                step_number: 1,
                line: 4,
                operation: OperationKind::Assignment,
                description: "x = 5".to_string(),
                frame_count: 1,
                heap_count: 0,
                pointer_count: 0,
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["type"], "StepCompleted");
        assert_eq!(json["kind"]["operation"], "Assignment");

        let back: ReplayEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
