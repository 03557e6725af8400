//! MemViz Core Types
//!
//! Pure value types shared by every MemViz crate: identifiers, memory
//! addresses, wall-clock timestamps, and the core error type.
//! Nothing in this crate performs I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod error;
pub mod id;
pub mod time;

// Re-exports
pub use address::MemoryAddress;
pub use error::{CoreError, CoreResult};
pub use id::{EventId, FrameId, HeapObjectId, PointerId, ReplayId, StepId, VariableId};
pub use time::{Duration, Timestamp};
