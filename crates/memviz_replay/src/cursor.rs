//! Position within a step sequence.

use crate::error::ReplayError;
use serde::{Deserialize, Serialize};

/// Current step position; `-1` when not positioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct StepCursor {
    position: Option<usize>,
}

impl StepCursor {
    /// Unpositioned cursor
    #[must_use]
    pub const fn new() -> Self {
        Self { position: None }
    }

    /// Cursor at `index`
    #[must_use]
    pub const fn at(index: usize) -> Self {
        Self {
            position: Some(index),
        }
    }

    /// Position as an index, `-1` when unpositioned
    #[must_use]
    pub fn index(&self) -> i64 {
        self.position.map_or(-1, |p| p as i64)
    }

    /// Position, if any
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        self.position
    }

    /// Move one step forward; an unpositioned cursor moves to 0
    pub fn move_forward(&mut self) {
        self.position = Some(self.position.map_or(0, |p| p + 1));
    }

    /// Move one step back, stopping at 0
    pub fn move_backward(&mut self) {
        if let Some(p) = self.position {
            self.position = Some(p.saturating_sub(1));
        }
    }

    /// Jump to `index`
    pub fn seek(&mut self, index: usize) {
        self.position = Some(index);
    }

    /// Unposition the cursor
    pub fn reset(&mut self) {
        self.position = None;
    }
}

impl From<StepCursor> for i64 {
    fn from(cursor: StepCursor) -> Self {
        cursor.index()
    }
}

impl TryFrom<i64> for StepCursor {
    type Error = ReplayError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        if index == -1 {
            return Ok(Self::new());
        }
        usize::try_from(index)
            .map(Self::at)
            .map_err(|_| ReplayError::validation(format!("step index {} is below -1", index)))
    }
}
