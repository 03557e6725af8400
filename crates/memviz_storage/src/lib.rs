//! MemViz Storage
//!
//! The [`ReplayRepository`] port the orchestrating layer loads and saves
//! replays through, with an in-memory backend and a JSON file backend.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fs;
pub mod memory;
pub mod repository;
pub mod store;

pub use fs::FileRepository;
pub use memory::InMemoryRepository;
pub use repository::ReplayRepository;
pub use store::{open, StoreBackend, StoreConfig, StoreError, StoreResult, StoreStats};
