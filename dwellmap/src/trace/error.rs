//! Error types for reading GPS traces.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::coord::CoordError;

/// Result type for trace operations.
pub type TraceResult<T> = Result<T, TraceError>;

/// Errors that can occur while reading a daily trace file.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace file could not be opened.
    #[error("cannot open trace file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    /// Reading a line failed part way through the file.
    #[error("failed to read trace line {line}: {source}")]
    Read { line: usize, source: io::Error },

    /// A data row is missing a field or holds an unparseable value.
    #[error("malformed trace row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    /// A fix cannot be projected onto the tile grid.
    #[error("invalid coordinate at line {line}: {source}")]
    InvalidCoordinate { line: usize, source: CoordError },

    /// The file holds no data rows after the fixed header.
    #[error("trace file has no data rows after the header")]
    Empty,
}
