//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::models::{SortDirection, SortSpec, MODIFIED_KEY};
use crate::retry::RetryPolicy;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sort key applied at startup, on reset and on hydration.
    #[serde(default = "default_sort_key")]
    pub default_sort_key: String,
    /// Direction applied whenever the sort key changes.
    #[serde(default)]
    pub default_direction: SortDirection,
    /// Reload retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Snapshot persistence configuration.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

fn default_sort_key() -> String {
    MODIFIED_KEY.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_sort_key: default_sort_key(),
            default_direction: SortDirection::default(),
            retry: RetryConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Sort spec used at startup.
    pub fn default_sort(&self) -> SortSpec {
        SortSpec::new(self.default_sort_key.clone(), self.default_direction)
    }
}

/// Reload retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    250
}

fn default_max_delay() -> u64 {
    2000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl RetryConfig {
    /// Build the runtime policy.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: 2.0,
        }
    }
}

/// Snapshot persistence configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Whether snapshots are written at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Quiet period before a scheduled write, in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Snapshot file name, relative to the data directory.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_debounce() -> u64 {
    500
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("snapshot.json")
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: default_debounce(),
            snapshot_file: default_snapshot_file(),
        }
    }
}

impl PersistenceConfig {
    /// Debounce delay as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Resolve the snapshot path against `data_dir` unless already absolute.
    pub fn snapshot_path(&self, data_dir: &Path) -> PathBuf {
        if self.snapshot_file.is_absolute() {
            self.snapshot_file.clone()
        } else {
            data_dir.join(&self.snapshot_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_sort_key, MODIFIED_KEY);
        assert_eq!(config.default_direction, SortDirection::Descending);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.persistence.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            default_sort_key = "priority"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.default_sort_key, "priority");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.persistence.debounce_ms, 500);
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("default_sort_key"));

        let restored: EngineConfig = toml::from_str(&toml).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("engine.toml");
        let mut config = EngineConfig::default();
        config.default_direction = SortDirection::Ascending;
        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let policy = RetryConfig::default().policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_snapshot_path() {
        let config = PersistenceConfig::default();
        assert_eq!(
            config.snapshot_path(Path::new("/data")),
            PathBuf::from("/data/snapshot.json")
        );
    }
}
