//! Thresholds that drive dwell segmentation.

/// Default maximum gap between two fixes that still counts as continuous
/// presence (10 minutes).
pub const DEFAULT_TRACE_INTERVAL_SECS: u32 = 600;

/// Day numbers carry rounding noise well below a millisecond; comparisons
/// against second-based thresholds allow this much slack.
pub const TIME_EPSILON_SECS: f64 = 1e-3;

/// Configuration for dwell segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellConfig {
    /// Zoom level used to discretize fixes into tiles
    pub zoom: u8,
    /// Longest gap between fixes that still accumulates dwell time
    pub trace_interval_secs: u32,
    /// Minimum accumulated dwell for an episode to qualify
    pub time_in_place_secs: u32,
}

impl DwellConfig {
    /// Create a config with the default trace interval.
    pub fn new(zoom: u8, time_in_place_secs: u32) -> Self {
        Self {
            zoom,
            trace_interval_secs: DEFAULT_TRACE_INTERVAL_SECS,
            time_in_place_secs,
        }
    }

    /// Override the continuity gap.
    pub fn with_trace_interval_secs(mut self, secs: u32) -> Self {
        self.trace_interval_secs = secs;
        self
    }

    /// Whether a gap between two fixes keeps the dwell continuous.
    #[inline]
    pub fn is_continuous(&self, gap_secs: f64) -> bool {
        gap_secs <= self.trace_interval_secs as f64 + TIME_EPSILON_SECS
    }

    /// Whether an accumulated dwell meets the time-in-place threshold.
    #[inline]
    pub fn qualifies(&self, duration_secs: f64) -> bool {
        duration_secs + TIME_EPSILON_SECS >= self.time_in_place_secs as f64
    }
}
