//! Service configuration.

use memviz_core::{CoreError, CoreResult};
use memviz_storage::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Repository backend
    pub store: StoreConfig,
    /// Pause between streamed steps in milliseconds (0 = none)
    pub stream_step_delay_ms: u64,
    /// Longest accepted source text in characters
    pub max_source_len: usize,
    /// Longest accepted language tag in characters
    pub max_language_len: usize,
    /// Capacity of the event broadcast channel
    pub event_channel_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            stream_step_delay_ms: 0,
            max_source_len: 10_000,
            max_language_len: 50,
            event_channel_capacity: 256,
        }
    }
}

impl ServiceConfig {
    /// Parse from JSON; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or the values are invalid
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| CoreError::Internal {
            message: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        Self::from_json(&json)
    }

    /// Check limits are usable
    ///
    /// # Errors
    ///
    /// Returns error if a limit or capacity is zero
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_source_len == 0 {
            return Err(CoreError::validation("max_source_len", "must be positive"));
        }
        if self.max_language_len == 0 {
            return Err(CoreError::validation("max_language_len", "must be positive"));
        }
        if self.event_channel_capacity == 0 {
            return Err(CoreError::validation(
                "event_channel_capacity",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Use a different store
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// Set the pause between streamed steps
    #[must_use]
    pub fn with_stream_step_delay_ms(mut self, millis: u64) -> Self {
        self.stream_step_delay_ms = millis;
        self
    }

    /// Set the source length limit
    #[must_use]
    pub fn with_max_source_len(mut self, len: usize) -> Self {
        self.max_source_len = len;
        self
    }

    /// Set the event channel capacity
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// Pause between streamed steps
    #[must_use]
    pub fn stream_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.stream_step_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memviz_storage::StoreBackend;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_source_len, 10_000);
        assert_eq!(config.max_language_len, 50);
        assert_eq!(config.event_channel_capacity, 256);
        assert!(config.stream_delay().is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = ServiceConfig::from_json(
            r#"{"stream_step_delay_ms": 100, "store": {"backend": {"kind": "file", "dir": "replays"}}}"#,
        )
        .unwrap();
        assert_eq!(config.stream_delay(), std::time::Duration::from_millis(100));
        assert!(matches!(config.store.backend, StoreBackend::File { .. }));
        assert_eq!(config.max_language_len, 50);
    }

    #[test]
    fn test_from_json_rejects_zero_limits() {
        let result = ServiceConfig::from_json(r#"{"max_source_len": 0}"#);
        assert!(matches!(result, Err(CoreError::Validation { .. })));
    }

    #[test]
    fn test_from_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("memviz.json");
        std::fs::write(&path, r#"{"max_source_len": 42}"#).unwrap();
        assert_eq!(ServiceConfig::from_path(&path).unwrap().max_source_len, 42);
        assert!(ServiceConfig::from_path(tmp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ServiceConfig::default()
            .with_stream_step_delay_ms(5)
            .with_max_source_len(10)
            .with_event_channel_capacity(8)
            .with_store(StoreConfig::default().with_pretty_json(false));
        assert_eq!(config.stream_step_delay_ms, 5);
        assert_eq!(config.max_source_len, 10);
        assert_eq!(config.event_channel_capacity, 8);
        assert!(!config.store.pretty_json);
    }
}
