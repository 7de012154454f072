//! Dwell episodes emitted by the segmenter.

use chrono::NaiveDate;

use crate::coord::TileCoord;

/// One continuous stay at a single tile within one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DwellEpisode {
    /// Tile the subject stayed in
    pub tile: TileCoord,
    /// Accumulated time in the tile, counting only continuous gaps
    pub duration_secs: f64,
    /// Fixes attributed to the stay (first fix plus non-duplicate followers)
    pub sample_count: u32,
    /// Date of the first fix
    pub first_date: NaiveDate,
    /// Date of the last fix
    pub last_date: NaiveDate,
    /// Day number of the first fix in the tile
    pub started_at: f64,
    /// Day number of the last fix in the tile
    pub ended_at: f64,
    /// Hour of day (0-23) the tile was entered
    pub entry_hour: u8,
    /// Day of week of the stay, 0 = Sunday
    pub day_of_week: u8,
}

impl DwellEpisode {
    /// Accumulated duration in hours.
    #[inline]
    pub fn duration_hours(&self) -> f64 {
        self.duration_secs / 3600.0
    }
}
