//! MemViz Runtime
//!
//! The orchestrating layer around the replay state machine. A
//! [`ReplayService`] runs each operation as lock, load, mutate, drain,
//! persist, publish, with at most one operation in flight per replay.
//! [`StepStream`] advances a replay to its end and yields every step on the
//! way, stopping early when cancelled.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod locks;
pub mod service;
pub mod stream;

pub use config::ServiceConfig;
pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use locks::LockRegistry;
pub use service::ReplayService;
pub use stream::StepStream;
