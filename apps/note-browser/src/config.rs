//! Configuration for the note browser.

use note_view::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "note-browser";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_vault_dir")]
    pub vault_dir: PathBuf,
    /// Non-empty body lines shown as the preview.
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_vault_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|d| d.document_dir().map(|p| p.join("notes")))
        .unwrap_or_else(|| PathBuf::from("./notes"))
}

fn default_preview_lines() -> usize {
    2
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            preview_lines: default_preview_lines(),
            engine: EngineConfig::default(),
        }
    }
}

impl BrowserConfig {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .filter(|p| p.exists())
            .and_then(|p| match Self::load_from(&p) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring unreadable config");
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Where the pin/filter snapshot lives.
    pub fn snapshot_path(&self) -> PathBuf {
        let data_dir = directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        self.engine.persistence.snapshot_path(&data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use note_view::SortDirection;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: BrowserConfig = toml::from_str(
            r#"
            vault_dir = "/tmp/vault"

            [engine]
            default_sort_key = "priority"
            "#,
        )
        .unwrap();

        assert_eq!(config.vault_dir, PathBuf::from("/tmp/vault"));
        assert_eq!(config.preview_lines, 2);
        assert_eq!(config.engine.default_sort_key, "priority");
        assert_eq!(config.engine.default_direction, SortDirection::Descending);
        assert_eq!(config.engine.retry.max_attempts, 3);
    }

    #[test]
    fn test_serialized_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = BrowserConfig::default();
        config.preview_lines = 5;
        config.engine.persistence.enabled = false;

        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        let loaded = BrowserConfig::load_from(&path).unwrap();

        assert_eq!(loaded.preview_lines, 5);
        assert!(!loaded.engine.persistence.enabled);
        assert_eq!(loaded.vault_dir, config.vault_dir);
    }
}
