//! MemViz Memory Snapshot Model
//!
//! Records of the program memory captured at one replay step: stack
//! frames with their variables, heap objects with their fields, and the
//! pointers between them.
//!
//! These types are built up while a step is being captured and are then
//! frozen inside a step. Consumers only ever see them through shared
//! references.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod frame;
pub mod heap;
pub mod kind;
pub mod layout;
pub mod pointer;
pub mod variable;

pub use error::{MemoryError, MemoryResult};
pub use frame::StackFrame;
pub use heap::HeapObject;
pub use kind::{OperationKind, ValueKind};
pub use layout::AddressLayout;
pub use pointer::Pointer;
pub use variable::{Variable, NULL_POINTER_VALUE};
