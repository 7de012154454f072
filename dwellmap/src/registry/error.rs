//! Error types for the location registry.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while loading, merging into, or persisting a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry file exists but could not be read.
    #[error("failed to read registry {}: {source}", path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// The previous registry could not be copied to its backup path.
    #[error("failed to back up registry to {}: {source}", path.display())]
    BackupFailed { path: PathBuf, source: io::Error },

    /// The registry could not be rewritten.
    #[error("failed to write registry {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// The first line does not start with the column-header sentinel.
    #[error("invalid registry header: first line must begin with 'xTile', found '{found}'")]
    BadHeader { found: String },

    /// The run configuration echo on line 2 cannot be parsed.
    #[error("invalid registry configuration line: '{line}'")]
    BadConfigLine { line: String },

    /// The summary row is missing or has an unparseable field.
    #[error("malformed registry summary: {reason}")]
    MalformedSummary { reason: String },

    /// A location record line is malformed.
    #[error("malformed registry record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    /// The number of record lines disagrees with the summary's location count.
    #[error("registry lists {expected} qualifying locations but holds {found} records")]
    RecordCountMismatch { expected: usize, found: usize },

    /// The registry file holds more records than the configured capacity.
    #[error("registry file holds {found} records, more than the capacity of {capacity}")]
    CapacityExceededAtLoad { capacity: usize, found: usize },

    /// A new location would push the registry past its capacity.
    #[error("registry is full ({capacity} locations); cannot add another")]
    CapacityExceeded { capacity: usize },
}
