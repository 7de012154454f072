//! Interval statistics gathered while segmenting one day.

/// Running statistics over every gap between consecutive fixes of a day,
/// whether or not the gap belonged to a dwell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceStats {
    /// Fixes counted for the day (duplicate timestamps in one tile excluded)
    pub trace_count: u64,
    /// Sum of all gaps
    pub elapsed_secs: f64,
    /// Longest gap
    pub max_interval_secs: f64,
    /// Time of day (`HHMMSS`) of the fix that ended the longest gap
    pub max_interval_at: Option<String>,
    /// Shortest non-zero gap
    pub min_interval_secs: Option<f64>,
}

impl TraceStats {
    /// Fold one gap into the statistics.
    pub fn record_interval(&mut self, gap_secs: f64, at_hhmmss: impl FnOnce() -> String) {
        self.elapsed_secs += gap_secs;

        if gap_secs > self.max_interval_secs {
            self.max_interval_secs = gap_secs;
            self.max_interval_at = Some(at_hhmmss());
        }

        if gap_secs > 0.0 && self.min_interval_secs.map_or(true, |min| gap_secs < min) {
            self.min_interval_secs = Some(gap_secs);
        }
    }

    /// Elapsed time in hours.
    pub fn elapsed_hours(&self) -> f64 {
        self.elapsed_secs / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_interval_tracks_extremes() {
        let mut stats = TraceStats::default();
        stats.record_interval(5.0, || "000005".to_string());
        stats.record_interval(0.0, || "000005".to_string());
        stats.record_interval(120.0, || "000205".to_string());
        stats.record_interval(2.0, || "000207".to_string());

        assert_eq!(stats.elapsed_secs, 127.0);
        assert_eq!(stats.max_interval_secs, 120.0);
        assert_eq!(stats.max_interval_at.as_deref(), Some("000205"));
        assert_eq!(stats.min_interval_secs, Some(2.0));
    }

    #[test]
    fn test_zero_gaps_never_set_minimum() {
        let mut stats = TraceStats::default();
        stats.record_interval(0.0, String::new);
        assert_eq!(stats.min_interval_secs, None);
        assert_eq!(stats.max_interval_at, None);
    }
}
