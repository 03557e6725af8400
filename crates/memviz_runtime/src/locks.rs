//! Per-replay mutual exclusion.
//!
//! Every mutating operation holds the lock for its replay ID from load to
//! persist, so two operations on one replay never interleave. Operations on
//! different replays run concurrently.

use memviz_core::ReplayId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per replay ID
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<ReplayId, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`
    ///
    /// Access lasts until the returned guard is dropped.
    pub async fn acquire(&self, id: ReplayId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop entries nobody holds or waits on
    pub async fn prune(&self) {
        self.locks
            .lock()
            .await
            .retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of registered IDs
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Whether no IDs are registered
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let registry = Arc::new(LockRegistry::new());
        let id = ReplayId::new();

        let guard = registry.acquire(id).await;
        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let _guard = registry.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let registry = LockRegistry::new();
        let _a = registry.acquire(ReplayId::new()).await;
        let _b = tokio::time::timeout(
            Duration::from_millis(100),
            registry.acquire(ReplayId::new()),
        )
        .await
        .unwrap();
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_prune_keeps_held_locks() {
        let registry = LockRegistry::new();
        let held = registry.acquire(ReplayId::new()).await;
        drop(registry.acquire(ReplayId::new()).await);

        registry.prune().await;
        assert_eq!(registry.len().await, 1);

        drop(held);
        registry.prune().await;
        assert!(registry.is_empty().await);
    }
}
