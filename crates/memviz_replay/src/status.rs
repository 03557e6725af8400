//! Replay status and the transition table.
//!
//! [`check`] is the only place that decides whether an operation is legal
//! in a status. Operations with extra preconditions (non-empty sequence,
//! index bounds) test those after the table allows them.

use crate::error::{ReplayError, ReplayResult};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplayStatus {
    /// Created, never started
    Ready,
    /// Actively replaying
    Running,
    /// Suspended by the caller
    Paused,
    /// Reached the last step
    Completed,
    /// Stopped by an error
    Error,
    /// Rewound to a startable state
    Reset,
}

impl ReplayStatus {
    /// Whether forward progress has ended
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether `start` is legal
    #[must_use]
    pub const fn is_startable(self) -> bool {
        matches!(self, Self::Ready | Self::Reset)
    }

    /// Whether the replay is positioned on a step and may step
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl Default for ReplayStatus {
    fn default() -> Self {
        Self::Ready
    }
}

impl std::fmt::Display for ReplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ready => "Ready",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Error => "Error",
            Self::Reset => "Reset",
        };
        f.write_str(name)
    }
}

/// An operation on a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Begin at the first step
    Start,
    /// Advance one step
    StepForward,
    /// Go back one step
    StepBackward,
    /// Suspend
    Pause,
    /// Continue after a pause
    Resume,
    /// Finish
    Complete,
    /// Stop with an error
    SetError,
    /// Rewind to a startable state
    Reset,
    /// Jump to an index
    GoToStep,
    /// Add a step to the sequence
    AppendStep,
}

impl Operation {
    /// Lowercase verb phrase for messages and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::StepForward => "step forward",
            Self::StepBackward => "step backward",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::SetError => "set error",
            Self::Reset => "reset",
            Self::GoToStep => "go to step",
            Self::AppendStep => "append step",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `op` is allowed from `status`
#[must_use]
pub const fn permits(status: ReplayStatus, op: Operation) -> bool {
    use Operation as Op;
    use ReplayStatus as S;

    match op {
        Op::Start => matches!(status, S::Ready | S::Reset),
        Op::StepForward | Op::StepBackward => matches!(status, S::Running | S::Paused),
        Op::Pause => matches!(status, S::Running),
        Op::Resume => matches!(status, S::Paused),
        Op::Complete | Op::AppendStep => !matches!(status, S::Completed),
        Op::SetError | Op::Reset | Op::GoToStep => true,
    }
}

/// Check `op` against the table
///
/// # Errors
///
/// Returns [`ReplayError::SequenceClosed`] for an append to a completed
/// replay and [`ReplayError::InvalidTransition`] for any other refusal
pub fn check(status: ReplayStatus, op: Operation) -> ReplayResult<()> {
    if permits(status, op) {
        return Ok(());
    }
    match op {
        Operation::AppendStep => Err(ReplayError::SequenceClosed),
        attempted => Err(ReplayError::InvalidTransition {
            from: status,
            attempted,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ReplayStatus; 6] = [
        ReplayStatus::Ready,
        ReplayStatus::Running,
        ReplayStatus::Paused,
        ReplayStatus::Completed,
        ReplayStatus::Error,
        ReplayStatus::Reset,
    ];

    #[test]
    fn test_start_only_from_ready_or_reset() {
        for status in ALL_STATUSES {
            assert_eq!(
                permits(status, Operation::Start),
                status.is_startable(),
                "{}",
                status
            );
        }
    }

    #[test]
    fn test_stepping_only_when_active() {
        for status in ALL_STATUSES {
            for op in [Operation::StepForward, Operation::StepBackward] {
                assert_eq!(permits(status, op), status.is_active());
            }
        }
    }

    #[test]
    fn test_pause_resume() {
        assert!(permits(ReplayStatus::Running, Operation::Pause));
        assert!(!permits(ReplayStatus::Paused, Operation::Pause));
        assert!(permits(ReplayStatus::Paused, Operation::Resume));
        assert!(!permits(ReplayStatus::Running, Operation::Resume));
    }

    #[test]
    fn test_always_allowed() {
        for status in ALL_STATUSES {
            assert!(permits(status, Operation::SetError));
            assert!(permits(status, Operation::Reset));
            assert!(permits(status, Operation::GoToStep));
        }
    }

    #[test]
    fn test_check_errors() {
        assert_eq!(
            check(ReplayStatus::Completed, Operation::AppendStep),
            Err(ReplayError::SequenceClosed)
        );
        assert_eq!(
            check(ReplayStatus::Ready, Operation::Pause),
            Err(ReplayError::InvalidTransition {
                from: ReplayStatus::Ready,
                attempted: Operation::Pause,
            })
        );
        assert!(check(ReplayStatus::Error, Operation::Complete).is_ok());
    }

    #[test]
    fn test_status_predicates() {
        assert!(ReplayStatus::Completed.is_terminal());
        assert!(ReplayStatus::Error.is_terminal());
        assert!(!ReplayStatus::Paused.is_terminal());
        assert_eq!(ReplayStatus::default(), ReplayStatus::Ready);
    }
}
