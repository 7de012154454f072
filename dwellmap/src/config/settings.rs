//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing logic.

use std::path::PathBuf;

use crate::registry::{KeyPolicy, MatchKey};
use crate::trust::TrustConfig;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Dwell segmentation settings
    pub dwell: DwellSettings,
    /// Registry settings
    pub registry: RegistrySettings,
    /// Trust score reference constants (`[trust]`)
    pub trust: TrustConfig,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Dwell segmentation configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DwellSettings {
    /// Longest gap between fixes that still counts as continuous presence
    pub trace_interval_secs: u32,
}

/// Registry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySettings {
    /// Maximum number of locations per subject
    pub capacity: usize,
    /// Which columns identify a location: "tile" or "tile_hour_dow"
    pub match_key: MatchKey,
    /// Hour column value written when keyed by tile
    pub hour_sentinel: u8,
    /// Day-of-week column value written when keyed by tile
    pub dow_sentinel: u8,
}

impl RegistrySettings {
    /// Record keying policy described by these settings.
    pub fn key_policy(&self) -> KeyPolicy {
        KeyPolicy {
            match_key: self.match_key,
            hour_sentinel: self.hour_sentinel,
            dow_sentinel: self.dow_sentinel,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Optional log file; console logging is always on
    pub file: Option<PathBuf>,
    /// Default filter level when RUST_LOG is not set
    pub level: String,
}
