//! Configuration file handling for ~/.dwellmap/config.ini.
//!
//! Settings structs live in [`super::settings`], defaults in
//! [`super::defaults`] and parsing in [`super::parser`].

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

pub use super::settings::*;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Explicitly requested config file does not exist
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load configuration from the default path (~/.dwellmap/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Load configuration from a path that must exist.
    pub fn load_required(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
        Self::load_from(path)
    }

    /// Parse configuration from INI text.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(content).map_err(ini::Error::Parse)?;
        super::parser::parse_ini(&ini)
    }
}

/// Get the path to the config directory (~/.dwellmap).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dwellmap")
}

/// Get the path to the config file (~/.dwellmap/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LOG_LEVEL;
    use crate::registry::MatchKey;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.dwell.trace_interval_secs, 600);
        assert_eq!(config.registry.capacity, 1000);
        assert_eq!(config.registry.match_key, MatchKey::Tile);
        assert_eq!(config.registry.hour_sentinel, 99);
        assert_eq!(config.registry.dow_sentinel, 9);
        assert_eq!(config.trust.ramp_days, 30);
        assert!(config.logging.file.is_none());
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_required_missing_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let err = ConfigFile::load_required(&config_path).unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(_)));
    }

    #[test]
    fn test_from_ini_str() {
        let config = ConfigFile::from_ini_str("[dwell]\ntrace_interval_secs = 120\n").unwrap();
        assert_eq!(config.dwell.trace_interval_secs, 120);
    }

    #[test]
    fn test_config_file_path() {
        assert!(config_file_path().ends_with(".dwellmap/config.ini"));
    }
}
