//! Pending event log.
//!
//! Events accumulate here in the order they were raised. Nothing is ever
//! removed except by [`EventLog::drain`].

use crate::event::ReplayEvent;

/// Events raised but not yet consumed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<ReplayEvent>,
}

impl EventLog {
    /// Create an empty log
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append one event
    pub fn record(&mut self, event: ReplayEvent) {
        self.events.push(event);
    }

    /// Events waiting to be drained
    #[must_use]
    pub fn pending(&self) -> &[ReplayEvent] {
        &self.events
    }

    /// Take every pending event, leaving the log empty
    pub fn drain(&mut self) -> Vec<ReplayEvent> {
        std::mem::take(&mut self.events)
    }
}
