//! Store configuration, errors and statistics.

use crate::fs::FileRepository;
use crate::memory::InMemoryRepository;
use crate::repository::ReplayRepository;
use memviz_core::CoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Where replays are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory, lost on exit
    Memory,
    /// One JSON file per replay
    File {
        /// Storage directory
        dir: PathBuf,
    },
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Memory
    }
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend
    pub backend: StoreBackend,
    /// Indent JSON files
    pub pretty_json: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            pretty_json: true,
        }
    }
}

impl StoreConfig {
    /// Use the file backend rooted at `dir`
    #[must_use]
    pub fn with_file_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backend = StoreBackend::File { dir: dir.into() };
        self
    }

    /// Set JSON indentation
    #[must_use]
    pub fn with_pretty_json(mut self, pretty: bool) -> Self {
        self.pretty_json = pretty;
        self
    }
}

/// Store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Replay not stored
    #[error("Replay not found: {id}")]
    NotFound {
        /// Replay ID
        id: String,
    },
    /// Replay already stored
    #[error("Replay already exists: {id}")]
    Conflict {
        /// Replay ID
        id: String,
    },
    /// Filesystem failure
    #[error("IO error: {reason}")]
    Io {
        /// Cause
        reason: String,
    },
    /// Encoding or decoding failure
    #[error("Serialization error: {reason}")]
    Serialization {
        /// Cause
        reason: String,
    },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => CoreError::NotFound {
                kind: "replay".to_string(),
                id,
            },
            other => CoreError::Validation {
                field: "store".to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Repository access counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Replays currently stored
    pub replay_count: usize,
    /// Successful loads
    pub read_count: u64,
    /// Successful saves and updates
    pub write_count: u64,
}

/// Open the repository described by `config`
///
/// # Errors
///
/// Returns error if the file backend's directory cannot be created
pub async fn open(config: &StoreConfig) -> StoreResult<Arc<dyn ReplayRepository>> {
    match &config.backend {
        StoreBackend::Memory => Ok(Arc::new(InMemoryRepository::new())),
        StoreBackend::File { dir } => {
            let repo = FileRepository::open(dir.clone())
                .await?
                .with_pretty_json(config.pretty_json);
            Ok(Arc::new(repo))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert!(config.pretty_json);
    }

    #[test]
    fn test_store_config_json() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"backend":{"kind":"file","dir":"/tmp/replays"}}"#).unwrap();
        assert_eq!(
            config.backend,
            StoreBackend::File {
                dir: PathBuf::from("/tmp/replays")
            }
        );
        assert!(config.pretty_json);

        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound {
            id: "replay_1".to_string(),
        };
        assert!(err.to_string().contains("not found"));
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let repo = open(&StoreConfig::default()).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_file_backend_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("replays");
        let config = StoreConfig::default().with_file_dir(&dir).with_pretty_json(false);
        let repo = open(&config).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(repo.stats().await.replay_count, 0);
    }
}
