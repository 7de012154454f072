//! Location records and the policy that decides when two stays share one.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::dwell::DwellEpisode;

/// Hour column value written when records are keyed by tile alone.
pub const DEFAULT_HOUR_SENTINEL: u8 = 99;

/// Day-of-week column value written when records are keyed by tile alone.
pub const DEFAULT_DOW_SENTINEL: u8 = 9;

/// Which columns identify a location record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchKey {
    /// Records are keyed by tile; hour and day-of-week hold sentinels.
    #[default]
    Tile,
    /// Records are keyed by tile, entry hour and day of week.
    TileHourDow,
}

impl MatchKey {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKey::Tile => "tile",
            MatchKey::TileHourDow => "tile_hour_dow",
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tile" => Ok(MatchKey::Tile),
            "tile_hour_dow" => Ok(MatchKey::TileHourDow),
            other => Err(format!(
                "unknown match key '{}', expected 'tile' or 'tile_hour_dow'",
                other
            )),
        }
    }
}

/// How episodes are keyed into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPolicy {
    pub match_key: MatchKey,
    pub hour_sentinel: u8,
    pub dow_sentinel: u8,
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            match_key: MatchKey::Tile,
            hour_sentinel: DEFAULT_HOUR_SENTINEL,
            dow_sentinel: DEFAULT_DOW_SENTINEL,
        }
    }
}

impl KeyPolicy {
    /// Hour and day-of-week values a record for this episode carries.
    pub fn slot_for(&self, episode: &DwellEpisode) -> (u8, u8) {
        match self.match_key {
            MatchKey::Tile => (self.hour_sentinel, self.dow_sentinel),
            MatchKey::TileHourDow => (episode.entry_hour, episode.day_of_week),
        }
    }

    /// Whether `record` is the one this episode merges into.
    pub fn matches(&self, record: &LocationRecord, episode: &DwellEpisode) -> bool {
        if record.x != episode.tile.x || record.y != episode.tile.y {
            return false;
        }
        match self.match_key {
            MatchKey::Tile => true,
            MatchKey::TileHourDow => {
                record.hour == episode.entry_hour && record.day_of_week == episode.day_of_week
            }
        }
    }
}

/// One persisted stay location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub x: u32,
    pub y: u32,
    pub hour: u8,
    pub day_of_week: u8,
    /// Number of qualifying stays merged into this record
    pub frequency: u32,
    /// Total qualifying dwell, in hours
    pub duration_hours: f64,
    /// Fixes attributed to the merged stays
    pub trace_count: u64,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl LocationRecord {
    /// Start a record from its first qualifying stay.
    pub fn from_episode(episode: &DwellEpisode, policy: &KeyPolicy) -> Self {
        let (hour, day_of_week) = policy.slot_for(episode);
        Self {
            x: episode.tile.x,
            y: episode.tile.y,
            hour,
            day_of_week,
            frequency: 1,
            duration_hours: episode.duration_hours(),
            trace_count: episode.sample_count as u64,
            first_date: episode.first_date,
            last_date: episode.last_date,
        }
    }

    /// Fold another qualifying stay into the record.
    pub fn absorb(&mut self, episode: &DwellEpisode, policy: &KeyPolicy) {
        let (hour, day_of_week) = policy.slot_for(episode);
        self.hour = hour;
        self.day_of_week = day_of_week;
        self.frequency += 1;
        self.duration_hours += episode.duration_hours();
        self.trace_count += episode.sample_count as u64;
        if episode.last_date > self.last_date {
            self.last_date = episode.last_date;
        }
    }
}

/// Inclusive bounding box of qualifying tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl TileBounds {
    /// Box covering a single tile.
    pub fn of(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Grow the box to cover a tile.
    pub fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Width in tiles, inclusive of both edges.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Height in tiles, inclusive of both edges.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }
}
