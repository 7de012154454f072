//! Default values for all configuration settings.

use super::settings::*;
use crate::dwell::DEFAULT_TRACE_INTERVAL_SECS;
use crate::registry::{MatchKey, DEFAULT_CAPACITY, DEFAULT_DOW_SENTINEL, DEFAULT_HOUR_SENTINEL};
use crate::trust::TrustConfig;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted values for `[logging] level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            dwell: DwellSettings {
                trace_interval_secs: DEFAULT_TRACE_INTERVAL_SECS,
            },
            registry: RegistrySettings {
                capacity: DEFAULT_CAPACITY,
                match_key: MatchKey::Tile,
                hour_sentinel: DEFAULT_HOUR_SENTINEL,
                dow_sentinel: DEFAULT_DOW_SENTINEL,
            },
            trust: TrustConfig::default(),
            logging: LoggingSettings {
                file: None,
                level: DEFAULT_LOG_LEVEL.to_string(),
            },
        }
    }
}
