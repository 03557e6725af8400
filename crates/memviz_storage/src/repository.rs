//! Repository port.

use crate::store::{StoreResult, StoreStats};
use async_trait::async_trait;
use memviz_core::ReplayId;
use memviz_replay::ReplayAggregate;

/// Load and persist replays by ID
///
/// Implementations give read-your-writes consistency for a single ID: a
/// `save` or `update` followed by `get_by_id` returns what was written.
#[async_trait]
pub trait ReplayRepository: Send + Sync {
    /// Load a replay
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) for an
    /// unknown ID
    async fn get_by_id(&self, id: ReplayId) -> StoreResult<ReplayAggregate>;

    /// Store a new replay
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`](crate::StoreError::Conflict) if the ID
    /// is already stored
    async fn save(&self, replay: &ReplayAggregate) -> StoreResult<()>;

    /// Overwrite an existing replay
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the ID
    /// is not stored
    async fn update(&self, replay: &ReplayAggregate) -> StoreResult<()>;

    /// Remove a replay
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if the ID
    /// is not stored
    async fn delete(&self, id: ReplayId) -> StoreResult<()>;

    /// Every stored replay, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be read
    async fn list_all(&self) -> StoreResult<Vec<ReplayAggregate>>;

    /// Access counters
    async fn stats(&self) -> StoreStats;
}
