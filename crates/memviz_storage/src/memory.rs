//! In-memory repository.

use crate::repository::ReplayRepository;
use crate::store::{StoreError, StoreResult, StoreStats};
use async_trait::async_trait;
use memviz_core::ReplayId;
use memviz_replay::ReplayAggregate;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Replays held in a map for the life of the process
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    replays: RwLock<HashMap<ReplayId, ReplayAggregate>>,
    stats: RwLock<StoreStats>,
}

impl InMemoryRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReplayRepository for InMemoryRepository {
    async fn get_by_id(&self, id: ReplayId) -> StoreResult<ReplayAggregate> {
        let replay = self
            .replays
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        self.stats.write().await.read_count += 1;
        Ok(replay)
    }

    async fn save(&self, replay: &ReplayAggregate) -> StoreResult<()> {
        let mut replays = self.replays.write().await;
        if replays.contains_key(&replay.id()) {
            return Err(StoreError::Conflict {
                id: replay.id().to_string(),
            });
        }
        replays.insert(replay.id(), replay.clone());

        let mut stats = self.stats.write().await;
        stats.replay_count = replays.len();
        stats.write_count += 1;
        Ok(())
    }

    async fn update(&self, replay: &ReplayAggregate) -> StoreResult<()> {
        let mut replays = self.replays.write().await;
        let slot = replays
            .get_mut(&replay.id())
            .ok_or_else(|| StoreError::NotFound {
                id: replay.id().to_string(),
            })?;
        *slot = replay.clone();
        self.stats.write().await.write_count += 1;
        Ok(())
    }

    async fn delete(&self, id: ReplayId) -> StoreResult<()> {
        let mut replays = self.replays.write().await;
        replays
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        self.stats.write().await.replay_count = replays.len();
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<ReplayAggregate>> {
        let mut all: Vec<_> = self.replays.read().await.values().cloned().collect();
        all.sort_by_key(ReplayAggregate::created_at);
        Ok(all)
    }

    async fn stats(&self) -> StoreStats {
        self.stats.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_memory::OperationKind;
    use memviz_replay::{ReplayStatus, SimulationStep};

    fn replay(steps: u32) -> ReplayAggregate {
        let mut agg = ReplayAggregate::new("int x;", "c").unwrap();
        for n in 0..steps {
            agg.add_step(
                SimulationStep::builder(n, 1, "int x;", OperationKind::Declaration)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        }
        agg
    }

    #[tokio::test]
    async fn test_save_then_get_roundtrip() {
        let repo = InMemoryRepository::new();
        let mut agg = replay(3);
        agg.start().unwrap();
        agg.step_forward().unwrap();
        agg.drain_events();

        repo.save(&agg).await.unwrap();
        let loaded = repo.get_by_id(agg.id()).await.unwrap();
        assert_eq!(loaded, agg);
        assert_eq!(loaded.status(), ReplayStatus::Running);
        assert_eq!(loaded.current_step_index(), 1);
    }

    #[tokio::test]
    async fn test_save_existing_conflicts() {
        let repo = InMemoryRepository::new();
        let agg = replay(1);
        repo.save(&agg).await.unwrap();
        assert!(matches!(
            repo.save(&agg).await,
            Err(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            repo.update(&replay(1)).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_overwrites() {
        let repo = InMemoryRepository::new();
        let mut agg = replay(2);
        repo.save(&agg).await.unwrap();

        agg.start().unwrap();
        repo.update(&agg).await.unwrap();
        let loaded = repo.get_by_id(agg.id()).await.unwrap();
        assert_eq!(loaded.status(), ReplayStatus::Running);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryRepository::new();
        let agg = replay(1);
        repo.save(&agg).await.unwrap();

        repo.delete(agg.id()).await.unwrap();
        assert!(matches!(
            repo.get_by_id(agg.id()).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(agg.id()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_all_and_stats() {
        let repo = InMemoryRepository::new();
        let first = replay(1);
        let second = replay(2);
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();
        repo.get_by_id(first.id()).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let stats = repo.stats().await;
        assert_eq!(stats.replay_count, 2);
        assert_eq!(stats.write_count, 2);
        assert_eq!(stats.read_count, 1);
    }
}
