use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::db::DEFAULT_BUSY_TIMEOUT;

/// Application configuration loaded from TOML config file.
/// All fields have defaults, so the config file is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `<name>.db` files (defaults to the working directory).
    pub db_dir: Option<PathBuf>,
    /// Write log lines to this file instead of stderr.
    pub log_file: Option<PathBuf>,
    /// How long to wait on a locked database file, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Exit non-zero when an operation fails.
    pub strict: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            log_file: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT.as_millis() as u64,
            strict: false,
        }
    }
}

/// Why a config file could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl AppConfig {
    /// Load config from `~/.config/trackmeta/config.toml`.
    /// Returns default config if file doesn't exist.
    ///
    /// Nothing is logged here: an unreadable or invalid file comes back as
    /// an error for the caller to report.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str::<AppConfig>(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.db_dir.is_none());
        assert!(!config.strict);
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "db_dir = \"/data/tracks\"\nstrict = true\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.db_dir, Some(PathBuf::from("/data/tracks")));
        assert!(config.strict);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_unparseable_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "busy_timeout_ms = \"soon\"").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
