//! CLI runner for common setup.
//!
//! Loads the config file and initializes logging before any work starts.

use std::path::{Path, PathBuf};

use dwellmap::config::ConfigFile;
use dwellmap::logging::{init_logging, LoggingGuard, LoggingOptions};

use crate::error::CliError;

/// Runner that owns the configuration and keeps logging alive.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load the config file and start logging.
    ///
    /// An explicit `config_path` must exist; the default path falls back to
    /// built-in defaults when absent. `log_file` overrides the configured
    /// log file.
    pub fn new(
        config_path: Option<&Path>,
        log_file: Option<PathBuf>,
        debug: bool,
    ) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_required(path)?,
            None => ConfigFile::load()?,
        };

        let options = LoggingOptions {
            level: config.logging.level.clone(),
            debug,
            file: log_file.or_else(|| config.logging.file.clone()),
        };
        let logging_guard = init_logging(&options).map_err(CliError::LoggingInit)?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }
}
