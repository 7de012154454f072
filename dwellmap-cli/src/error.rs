//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and the exit code that identifies each failure.

use std::fmt;
use std::process;

use dwellmap::config::ConfigFileError;
use dwellmap::error::RunError;

/// Exit code for bad invocations.
pub const EXIT_USAGE: i32 = 1;

/// Exit code for configuration file problems.
pub const EXIT_CONFIG: i32 = 13;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration file error
    Config(ConfigFileError),
    /// The daily run failed
    Run(RunError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::LoggingInit(_) => EXIT_USAGE,
            CliError::Config(_) => EXIT_CONFIG,
            CliError::Run(e) => e.exit_code(),
        }
    }

    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Run(
                RunError::ZoomMismatch { .. }
                | RunError::DurationMismatch { .. }
                | RunError::SettingMismatch { .. },
            ) => {
                eprintln!();
                eprintln!("A registry keeps the zoom level, time in place, match key and trace");
                eprintln!("interval it was created with. Re-run with the same values, or use a");
                eprintln!("different --registry-dir.");
            }
            CliError::Run(RunError::OutOfOrder { .. }) => {
                eprintln!();
                eprintln!("Traces must be processed in date order, one file per day.");
                eprintln!("The registry was left unchanged.");
            }
            _ => {}
        }

        process::exit(self.exit_code())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Run(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Run(e) => Some(e),
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        CliError::Run(e)
    }
}
