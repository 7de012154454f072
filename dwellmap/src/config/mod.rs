//! Configuration for dwellmap runs.
//!
//! Settings that vary between studies (continuity gap, registry capacity and
//! keying, trust reference constants, logging) live in an INI file, by
//! default `~/.dwellmap/config.ini`. Every key is optional.
//!
//! # Example
//!
//! ```
//! use dwellmap::config::ConfigFile;
//!
//! let config = ConfigFile::from_ini_str("[registry]\ncapacity = 250\n").unwrap();
//! assert_eq!(config.registry.capacity, 250);
//! assert_eq!(config.dwell.trace_interval_secs, 600);
//! ```

mod defaults;
mod file;
mod parser;
mod settings;

pub use defaults::{DEFAULT_LOG_LEVEL, LOG_LEVELS};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, DwellSettings, LoggingSettings, RegistrySettings};
