//! JSON file repository.
//!
//! Each replay lives in `<dir>/<replay id>.json`. Writes go to a temporary
//! file first and are renamed into place, so a crash never leaves a
//! half-written replay behind.

use crate::repository::ReplayRepository;
use crate::store::{StoreError, StoreResult, StoreStats};
use async_trait::async_trait;
use memviz_core::ReplayId;
use memviz_replay::ReplayAggregate;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const EXTENSION: &str = "json";

/// Replays persisted as JSON files in one directory
#[derive(Debug)]
pub struct FileRepository {
    dir: PathBuf,
    pretty: bool,
    stats: RwLock<StoreStats>,
}

impl FileRepository {
    /// Open a repository rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or read
    pub async fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let repo = Self {
            dir,
            pretty: true,
            stats: RwLock::new(StoreStats::default()),
        };
        let count = repo.replay_paths().await?.len();
        repo.stats.write().await.replay_count = count;

        tracing::debug!(dir = %repo.dir.display(), replays = count, "opened file repository");
        Ok(repo)
    }

    /// Set JSON indentation
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Storage directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn replay_path(&self, id: ReplayId) -> PathBuf {
        self.dir.join(format!("{}.{}", id, EXTENSION))
    }

    async fn replay_paths(&self) -> StoreResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    async fn read_file(path: &Path, id: impl std::fmt::Display) -> StoreResult<ReplayAggregate> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write_file(&self, replay: &ReplayAggregate) -> StoreResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(replay)?
        } else {
            serde_json::to_vec(replay)?
        };

        let path = self.replay_path(replay.id());
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        self.stats.write().await.write_count += 1;
        Ok(())
    }
}

#[async_trait]
impl ReplayRepository for FileRepository {
    async fn get_by_id(&self, id: ReplayId) -> StoreResult<ReplayAggregate> {
        let replay = Self::read_file(&self.replay_path(id), id).await?;
        self.stats.write().await.read_count += 1;
        Ok(replay)
    }

    async fn save(&self, replay: &ReplayAggregate) -> StoreResult<()> {
        if tokio::fs::try_exists(self.replay_path(replay.id())).await? {
            return Err(StoreError::Conflict {
                id: replay.id().to_string(),
            });
        }
        self.write_file(replay).await?;
        self.stats.write().await.replay_count += 1;
        Ok(())
    }

    async fn update(&self, replay: &ReplayAggregate) -> StoreResult<()> {
        if !tokio::fs::try_exists(self.replay_path(replay.id())).await? {
            return Err(StoreError::NotFound {
                id: replay.id().to_string(),
            });
        }
        self.write_file(replay).await
    }

    async fn delete(&self, id: ReplayId) -> StoreResult<()> {
        match tokio::fs::remove_file(self.replay_path(id)).await {
            Ok(()) => {
                let mut stats = self.stats.write().await;
                stats.replay_count = stats.replay_count.saturating_sub(1);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<ReplayAggregate>> {
        let mut all = Vec::new();
        for path in self.replay_paths().await? {
            let name = path.display().to_string();
            all.push(Self::read_file(&path, name).await?);
        }
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
        let mut agg = ReplayAggregate::new("int *p = 0;", "c").unwrap();
        for n in 0..steps {
            agg.add_step(
                SimulationStep::builder(n, 1, "int *p = 0;", OperationKind::PointerAssignment)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        }
        agg
    }

    #[tokio::test]
    async fn test_file_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path()).await.unwrap();

        let mut agg = replay(3);
        agg.go_to_step(2).unwrap();
        agg.drain_events();
        repo.save(&agg).await.unwrap();

        let loaded = repo.get_by_id(agg.id()).await.unwrap();
        assert_eq!(loaded, agg);
        assert_eq!(loaded.current_step_index(), 2);
        assert!(loaded.has_started());
    }

    #[tokio::test]
    async fn test_file_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let agg = replay(1);
        {
            let repo = FileRepository::open(tmp.path()).await.unwrap();
            repo.save(&agg).await.unwrap();
        }

        let repo = FileRepository::open(tmp.path()).await.unwrap();
        assert_eq!(repo.stats().await.replay_count, 1);
        assert_eq!(repo.get_by_id(agg.id()).await.unwrap().id(), agg.id());
    }

    #[tokio::test]
    async fn test_file_conflict_and_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path())
            .await
            .unwrap()
            .with_pretty_json(false);
        let agg = replay(1);

        assert!(matches!(
            repo.update(&agg).await,
            Err(StoreError::NotFound { .. })
        ));
        repo.save(&agg).await.unwrap();
        assert!(matches!(
            repo.save(&agg).await,
            Err(StoreError::Conflict { .. })
        ));
        assert!(matches!(
            repo.get_by_id(ReplayId::new()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_update_and_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path()).await.unwrap();
        let mut agg = replay(2);
        repo.save(&agg).await.unwrap();

        agg.start().unwrap();
        agg.drain_events();
        repo.update(&agg).await.unwrap();
        assert_eq!(
            repo.get_by_id(agg.id()).await.unwrap().status(),
            ReplayStatus::Running
        );

        repo.delete(agg.id()).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(agg.id()).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_list_ignores_other_files() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path()).await.unwrap();
        repo.save(&replay(1)).await.unwrap();
        repo.save(&replay(2)).await.unwrap();
        tokio::fs::write(tmp.path().join("notes.txt"), b"ignore me")
            .await
            .unwrap();

        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_corrupt_json() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path()).await.unwrap();
        let id = ReplayId::new();
        tokio::fs::write(tmp.path().join(format!("{}.json", id)), b"{broken")
            .await
            .unwrap();
        assert!(matches!(
            repo.get_by_id(id).await,
            Err(StoreError::Serialization { .. })
        ));
    }

    #[tokio::test]
    async fn test_file_rejects_index_past_last_step() {
        let tmp = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(tmp.path()).await.unwrap();
        let mut agg = replay(2);
        agg.start().unwrap();
        repo.save(&agg).await.unwrap();

        let path = tmp.path().join(format!("{}.json", agg.id()));
        let mut stored: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
        stored["current_step_index"] = serde_json::json!(9);
        tokio::fs::write(&path, serde_json::to_vec(&stored).unwrap())
            .await
            .unwrap();

        assert!(matches!(
            repo.get_by_id(agg.id()).await,
            Err(StoreError::Serialization { .. })
        ));
    }
}
