//! MemViz Replay State Machine
//!
//! Step-by-step navigation over a recorded sequence of memory snapshots.
//! A [`ReplayAggregate`] owns the steps, the current position and the
//! lifecycle status. Every transition is checked against one table in
//! [`status`] and returns the events it raised.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod cursor;
pub mod error;
pub mod recording;
pub mod sequence;
pub mod status;
pub mod step;
pub mod view;

pub use aggregate::ReplayAggregate;
pub use cursor::StepCursor;
pub use error::{ReplayError, ReplayResult};
pub use recording::Recording;
pub use sequence::StepSequence;
pub use status::{Operation, ReplayStatus};
pub use step::{SimulationStep, SimulationStepBuilder};
pub use view::ReplayView;
