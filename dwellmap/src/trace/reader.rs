//! Lazy reader for GeoLife `.plt` trace files.
//!
//! A `.plt` file starts with six header lines that carry no fixes, followed
//! by one fix per line:
//!
//! ```text
//! 39.984702,116.318417,0,492,39744.1201851852,2008-10-23,02:53:04
//! ```
//!
//! Fields are latitude, longitude, an always-zero field, altitude, the
//! fractional day number, the date and the time of day. The third and fourth
//! fields are ignored. Dates are accepted as `YYYY-MM-DD` or `YYYYMMDD`,
//! times as `HH:MM:SS` or `HHMMSS`.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use super::error::{TraceError, TraceResult};
use super::sample::Sample;
use crate::coord::{CoordError, MAX_ABS_LAT, MAX_LON, MIN_LON};

/// Number of non-data lines at the top of every trace file.
pub const HEADER_LINES: usize = 6;

/// Iterator over the fixes of one trace file.
///
/// The header is skipped on the first call to `next`. Each item is either a
/// parsed [`Sample`] or the error for that line; blank lines are skipped.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
    header_skipped: bool,
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file from disk.
    pub fn open(path: &Path) -> TraceResult<Self> {
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Opened trace file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wrap any buffered reader holding `.plt` content.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            header_skipped: false,
        }
    }

    fn skip_header(&mut self) -> TraceResult<()> {
        while self.line_no < HEADER_LINES {
            match self.lines.next() {
                Some(Ok(_)) => self.line_no += 1,
                Some(Err(source)) => {
                    return Err(TraceError::Read {
                        line: self.line_no + 1,
                        source,
                    })
                }
                None => break,
            }
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = TraceResult<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.header_skipped {
            self.header_skipped = true;
            if let Err(e) = self.skip_header() {
                return Some(Err(e));
            }
        }

        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(source) => {
                    return Some(Err(TraceError::Read {
                        line: self.line_no,
                        source,
                    }))
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(parse_row(&line, self.line_no));
        }
    }
}

/// Parse one data row of a trace file.
pub fn parse_row(row: &str, line: usize) -> TraceResult<Sample> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() < 7 {
        return Err(TraceError::MalformedRow {
            line,
            reason: format!("expected 7 fields, found {}", fields.len()),
        });
    }

    let lat: f64 = parse_field(fields[0], "latitude", line)?;
    let lon: f64 = parse_field(fields[1], "longitude", line)?;
    let day_number: f64 = parse_field(fields[4], "day number", line)?;
    let date = parse_date(fields[5]).ok_or_else(|| TraceError::MalformedRow {
        line,
        reason: format!("invalid date '{}'", fields[5]),
    })?;
    let time = parse_time(fields[6]).ok_or_else(|| TraceError::MalformedRow {
        line,
        reason: format!("invalid time '{}'", fields[6]),
    })?;

    if !lat.is_finite() || lat.abs() >= MAX_ABS_LAT {
        return Err(TraceError::InvalidCoordinate {
            line,
            source: CoordError::InvalidLatitude(lat),
        });
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(TraceError::InvalidCoordinate {
            line,
            source: CoordError::InvalidLongitude(lon),
        });
    }
    if !day_number.is_finite() {
        return Err(TraceError::MalformedRow {
            line,
            reason: format!("day number '{}' is not finite", fields[4]),
        });
    }

    Ok(Sample {
        lat,
        lon,
        day_number,
        date,
        time,
        line,
    })
}

fn parse_field(value: &str, name: &str, line: usize) -> TraceResult<f64> {
    value.parse().map_err(|_| TraceError::MalformedRow {
        line,
        reason: format!("invalid {} '{}'", name, value),
    })
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H%M%S"))
        .ok()
}
