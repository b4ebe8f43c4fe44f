// Session configuration

use crate::command::DEFAULT_MAX_HISTORY;
use crate::media::default_extensions;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "playlist_core";

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for a playlist session
///
/// Every field has a default, so a partial config file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Depth of the undo and redo stacks
    pub history_depth: usize,
    /// Where the playlist is saved between runs
    pub playlist_path: PathBuf,
    /// File extensions (lowercase, without dot) accepted when adding paths
    pub supported_extensions: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_MAX_HISTORY,
            playlist_path: default_playlist_path(),
            supported_extensions: default_extensions(),
        }
    }
}

impl SessionConfig {
    /// Load config from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Load config, falling back to defaults when the file is missing or invalid
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config as JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.json")
}

/// Default location of the saved playlist
pub fn default_playlist_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("playlist.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.history_depth, 10);
        let expected = Path::new("playlist_core").join("playlist.json");
        assert!(config.playlist_path.ends_with(expected));
        assert!(config.supported_extensions.contains(&"mp3".to_string()));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"history_depth": 3}"#).unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.history_depth, 3);
        assert_eq!(config.supported_extensions, default_extensions());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.json");
        let config = SessionConfig {
            history_depth: 25,
            playlist_path: dir.path().join("list.json"),
            supported_extensions: vec!["flac".to_string()],
        };

        config.save(&path).unwrap();
        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_or_default_tolerates_bad_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            SessionConfig::load_or_default(dir.path().join("missing.json")),
            SessionConfig::default()
        );

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert_eq!(
            SessionConfig::load_or_default(&broken),
            SessionConfig::default()
        );
        let result = SessionConfig::load(&broken);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }
}
