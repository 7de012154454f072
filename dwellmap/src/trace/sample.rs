//! A single GPS fix.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Seconds in one day, the unit of [`Sample::day_number`].
pub const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// One raw trace reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
    /// Days since 1899-12-30; the fractional part is the time of day
    pub day_number: f64,
    /// Calendar date of the fix
    pub date: NaiveDate,
    /// Time of day of the fix
    pub time: NaiveTime,
    /// 1-based line in the source file, for diagnostics
    pub line: usize,
}

impl Sample {
    /// Hour of day (0-23) the fix was taken in.
    pub fn hour(&self) -> u8 {
        self.time.hour() as u8
    }

    /// Day of week, 0 = Sunday.
    pub fn day_of_week(&self) -> u8 {
        self.date.weekday().num_days_from_sunday() as u8
    }

    /// Time of day as `HHMMSS`.
    pub fn hhmmss(&self) -> String {
        self.time.format("%H%M%S").to_string()
    }

    /// Fourteen character `YYYYMMDDHHMMSS` stamp of the fix.
    pub fn stamp(&self) -> String {
        format!("{}{}", self.date.format("%Y%m%d"), self.hhmmss())
    }
}
