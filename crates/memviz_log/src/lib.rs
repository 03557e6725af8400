//! MemViz Event Log
//!
//! Lifecycle notifications raised by a replay, the pending log they wait
//! in until a collaborator drains them, and the publishers that deliver
//! drained events to the outside world.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod log;
pub mod publish;

pub use event::{CompletionStatus, ReplayEvent, ReplayEventKind};
pub use log::EventLog;
pub use publish::{BroadcastPublisher, CompositePublisher, EventPublisher, TracingPublisher};
