//! Logging infrastructure for dwellmap.
//!
//! Provides structured logging to stderr and, optionally, to a file:
//! - stderr keeps stdout free for the run report
//! - the log file is appended to, so one file can collect many daily runs
//! - configurable via RUST_LOG, falling back to the configured level

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_LEVEL;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Logging options gathered from the command line and config file.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Default level when RUST_LOG is not set
    pub level: String,
    /// Force debug level
    pub debug: bool,
    /// Optional log file
    pub file: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            debug: false,
            file: None,
        }
    }
}

impl LoggingOptions {
    /// Filter directive used when RUST_LOG is not set.
    pub fn default_directive(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.level
        }
    }
}

/// Split a log file path into the directory and file name the appender
/// expects, creating the directory if needed.
fn prepare_log_file(path: &Path) -> Result<(PathBuf, PathBuf), io::Error> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log file path has no file name: {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;
    Ok((dir, PathBuf::from(file_name)))
}

/// Initialize logging system.
///
/// Installs a global subscriber with a stderr layer and, when `options.file`
/// is set, a plain-text file layer behind a non-blocking writer.
///
/// # Returns
///
/// LoggingGuard that must be kept alive for logging to work
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a global
/// subscriber is already installed
pub fn init_logging(options: &LoggingOptions) -> Result<LoggingGuard, io::Error> {
    let (file_layer, file_guard) = match &options.file {
        Some(path) => {
            let (dir, file_name) = prepare_log_file(path)?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive() {
        let mut options = LoggingOptions::default();
        assert_eq!(options.default_directive(), "info");

        options.level = "warn".to_string();
        assert_eq!(options.default_directive(), "warn");

        options.debug = true;
        assert_eq!(options.default_directive(), "debug");
    }

    #[test]
    fn test_prepare_log_file_creates_directory() {
        // Can't test init_logging because of the global subscriber, but the
        // file preparation is independent of it
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/nested/dwellmap.log");

        let (dir, name) = prepare_log_file(&path).unwrap();
        assert!(dir.exists());
        assert_eq!(dir, temp.path().join("logs/nested"));
        assert_eq!(name, PathBuf::from("dwellmap.log"));
    }

    #[test]
    fn test_prepare_log_file_bare_name() {
        let (dir, name) = prepare_log_file(Path::new("dwellmap.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("dwellmap.log"));
    }

    #[test]
    fn test_prepare_log_file_rejects_directory_path() {
        assert!(prepare_log_file(Path::new("/")).is_err());
    }
}
