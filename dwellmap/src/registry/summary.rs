//! Cumulative run summary carried in the registry header.

use std::fmt;
use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use super::record::TileBounds;
use crate::dwell::TraceStats;

/// Ceiling the shortest-interval statistic starts from before any day has
/// been folded in.
pub const MIN_INTERVAL_CEILING_SECS: f64 = 3600.0;

fn stamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})(\d{2})(\d{2})\d{6}$").expect("valid stamp regex")
    })
}

/// A `YYYYMMDDHHMMSS` stamp identifying one daily run.
///
/// Stamps compare as their text, which is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunStamp {
    text: String,
    date: NaiveDate,
}

impl RunStamp {
    /// Accept a fourteen digit stamp whose date part is a real calendar date.
    pub fn parse(s: &str) -> Option<Self> {
        let captures = stamp_pattern().captures(s)?;
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        Some(Self {
            text: s.to_string(),
            date,
        })
    }

    /// Stamp for a fix taken at `date` and `time`.
    pub fn from_date_time(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            text: format!("{}{}", date.format("%Y%m%d"), time.format("%H%M%S")),
            date,
        }
    }

    /// Calendar date of the run.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Totals accumulated over every run folded into a registry.
///
/// The number of qualifying locations is not stored here; it is always the
/// length of the record list it travels with.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub first_stamp: RunStamp,
    pub last_stamp: RunStamp,
    /// Days of trace processed
    pub total_days: u32,
    /// Hours spanned by those traces
    pub total_hours: f64,
    /// Every episode seen, qualifying or not
    pub total_locations: u64,
    /// Dwell hours of qualifying episodes
    pub qualifying_hours: f64,
    /// Days with at least one qualifying episode
    pub qualifying_days: u32,
    /// Extent of qualifying tiles, absent until one exists
    pub bounds: Option<TileBounds>,
    /// Label of the subject from the most recent run
    pub subject: String,
    pub trust: f64,
    pub trace_count: u64,
    pub max_interval_secs: f64,
    pub max_interval_at: Option<String>,
    pub min_interval_secs: f64,
    /// Sum of every gap between fixes, in seconds
    pub elapsed_secs: f64,
    /// Fixes attributed to qualifying episodes
    pub qualifying_trace_count: u64,
}

impl RunSummary {
    /// Summary for a subject's first run.
    pub fn new(stamp: RunStamp, subject: impl Into<String>) -> Self {
        Self {
            first_stamp: stamp.clone(),
            last_stamp: stamp,
            total_days: 0,
            total_hours: 0.0,
            total_locations: 0,
            qualifying_hours: 0.0,
            qualifying_days: 0,
            bounds: None,
            subject: subject.into(),
            trust: 0.0,
            trace_count: 0,
            max_interval_secs: 0.0,
            max_interval_at: None,
            min_interval_secs: MIN_INTERVAL_CEILING_SECS,
            elapsed_secs: 0.0,
            qualifying_trace_count: 0,
        }
    }

    /// Grow the qualifying extent to cover a tile.
    pub fn include_tile(&mut self, x: u32, y: u32) {
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(x, y),
            None => self.bounds = Some(TileBounds::of(x, y)),
        }
    }

    /// Close out one day: advance the stamp and fold in its statistics.
    pub fn record_day(&mut self, stamp: RunStamp, stats: &TraceStats, qualified: bool) {
        self.last_stamp = stamp;
        self.total_days += 1;
        if qualified {
            self.qualifying_days += 1;
        }
        self.total_hours += stats.elapsed_hours();
        self.elapsed_secs += stats.elapsed_secs;
        self.trace_count += stats.trace_count;

        if stats.max_interval_secs > self.max_interval_secs {
            self.max_interval_secs = stats.max_interval_secs;
            self.max_interval_at = stats.max_interval_at.clone();
        }
        if let Some(min) = stats.min_interval_secs {
            if min < self.min_interval_secs {
                self.min_interval_secs = min;
            }
        }
    }

    /// Share of traced hours spent at qualifying locations, as a percentage.
    pub fn qualifying_hours_pct(&self) -> f64 {
        ratio(self.qualifying_hours, self.total_hours) * 100.0
    }

    pub fn traces_per_day(&self) -> f64 {
        ratio(self.trace_count as f64, self.total_days as f64)
    }

    /// Mean gap between fixes; each day contributes one gap fewer than its
    /// fix count.
    pub fn average_interval_secs(&self) -> f64 {
        let gaps = self.trace_count.saturating_sub(self.total_days as u64);
        ratio(self.elapsed_secs, gaps as f64)
    }
}

/// `numerator / denominator`, or zero when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
