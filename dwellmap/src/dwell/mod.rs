//! Dwell segmentation.
//!
//! Splits a day's fixes into episodes of continuous presence in one tile.
//! Gaps longer than the configured trace interval do not add dwell time, and
//! an episode only matters downstream when its accumulated dwell reaches the
//! time-in-place threshold.

mod config;
mod episode;
mod segmenter;
mod stats;

pub use config::{DwellConfig, DEFAULT_TRACE_INTERVAL_SECS, TIME_EPSILON_SECS};
pub use episode::DwellEpisode;
pub use segmenter::DwellSegmenter;
pub use stats::TraceStats;
