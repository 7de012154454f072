//! Errors of a daily run and their process exit codes.

use thiserror::Error;

use crate::config::ConfigFileError;
use crate::coord::CoordError;
use crate::registry::{RegistryError, RunStamp};
use crate::trace::TraceError;

/// Result type for a daily run.
pub type RunResult<T> = Result<T, RunError>;

/// Everything that can stop a daily run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Invocation values outside their valid range.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Config(#[from] ConfigFileError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The registry was built at a different zoom level.
    #[error("registry zoom level {registry} does not match requested zoom level {requested}")]
    ZoomMismatch { registry: u8, requested: u8 },

    /// The registry was built with a different time-in-place threshold.
    #[error("registry time in place of {registry} seconds does not match requested {requested} seconds")]
    DurationMismatch { registry: u32, requested: u32 },

    /// The registry was built with a different key policy or trace interval.
    #[error("registry {setting} of {registry} does not match requested {requested}")]
    SettingMismatch {
        setting: &'static str,
        registry: String,
        requested: String,
    },

    /// The trace is not dated after the registry's last run.
    #[error("trace dated {run} is not later than the last processed trace {last}")]
    OutOfOrder { run: RunStamp, last: RunStamp },
}

impl From<CoordError> for RunError {
    fn from(e: CoordError) -> Self {
        RunError::InvalidArguments(e.to_string())
    }
}

impl RunError {
    /// Process exit code for this failure.
    ///
    /// | code | failure |
    /// |------|---------|
    /// | 1 | bad invocation |
    /// | 2 | unreadable input |
    /// | 3 | bad registry file |
    /// | 4 | zoom mismatch |
    /// | 5 | time-in-place mismatch |
    /// | 6 | out-of-order trace date |
    /// | 7 | capacity exceeded at load |
    /// | 8 | record count mismatch |
    /// | 9 | registry write failure |
    /// | 10 | empty input |
    /// | 11 | capacity exceeded at merge |
    /// | 12 | malformed trace data |
    /// | 13 | configuration file error |
    /// | 14 | match key or trace interval mismatch |
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::InvalidArguments(_) => 1,
            RunError::Trace(TraceError::Open { .. } | TraceError::Read { .. }) => 2,
            RunError::Trace(TraceError::Empty) => 10,
            RunError::Trace(
                TraceError::MalformedRow { .. } | TraceError::InvalidCoordinate { .. },
            ) => 12,
            RunError::Registry(e) => match e {
                RegistryError::ReadFailed { .. }
                | RegistryError::BadHeader { .. }
                | RegistryError::BadConfigLine { .. }
                | RegistryError::MalformedSummary { .. }
                | RegistryError::MalformedRecord { .. } => 3,
                RegistryError::CapacityExceededAtLoad { .. } => 7,
                RegistryError::RecordCountMismatch { .. } => 8,
                RegistryError::BackupFailed { .. } | RegistryError::WriteFailed { .. } => 9,
                RegistryError::CapacityExceeded { .. } => 11,
            },
            RunError::ZoomMismatch { .. } => 4,
            RunError::DurationMismatch { .. } => 5,
            RunError::OutOfOrder { .. } => 6,
            RunError::Config(_) => 13,
            RunError::SettingMismatch { .. } => 14,
        }
    }
}
