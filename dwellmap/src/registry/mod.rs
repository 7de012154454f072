//! Persistent per-subject registry of stay locations.
//!
//! A registry holds every location where a subject has dwelled at least the
//! time-in-place threshold, together with running totals over all days
//! processed so far. Each daily run loads it, folds the day's episodes in,
//! and writes it back sorted by total duration.

mod codec;
mod error;
mod merge;
mod record;
mod store;
mod summary;
mod writer;

pub use codec::{
    decode, encode, format_record, parse_record, DecodedRegistry, DerivedColumns,
    RegistryHeader, HEADER_LINE, HEADER_SENTINEL, SUMMARY_FIELDS, SUMMARY_LABELS, TOP_SHARES,
};
pub use error::{RegistryError, RegistryResult};
pub use merge::{LocationMerger, LocationRegistry, MergeOutcome, MergeTally, DEFAULT_CAPACITY};
pub use record::{
    KeyPolicy, LocationRecord, MatchKey, TileBounds, DEFAULT_DOW_SENTINEL, DEFAULT_HOUR_SENTINEL,
};
pub use store::{RegistryStore, BACKUP_EXTENSION, REGISTRY_SUFFIX};
pub use summary::{ratio, RunStamp, RunSummary, MIN_INTERVAL_CEILING_SECS};
pub use writer::{top_shares, RegistryWriter};
