//! Text encoding of a registry file.
//!
//! Layout:
//!
//! ```text
//! xTile,yTile,Hour,DOW,Freq,Hours Duration,FirstDate,LastDate
//! zoom level=16, seconds=3600, match_key=tile, trace_interval=600, version=dwellmap 0.1.0
//! 1st date/time,Last date/time,Tot days,...          (summary labels)
//! 20081023025304,20081024012345,2,...                (summary row)
//! 53943,24814,99,9,002,003.500000,412,20081023,20081024
//! ...                                                 (one line per location)
//! ```
//!
//! Record lines keep the historical padding: frequency is three digits and
//! duration is zero-padded to ten characters with six decimals, both
//! growing unpadded past 999. Summary floats are written in their shortest
//! round-trip form.
//!
//! Files written before the match key and trace interval were echoed lack
//! those entries; they read back as `tile` and 600 seconds.

use std::fmt::Write as _;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use super::error::{RegistryError, RegistryResult};
use super::record::{LocationRecord, MatchKey, TileBounds};
use super::summary::{RunStamp, RunSummary};
use crate::dwell::DEFAULT_TRACE_INTERVAL_SECS;
use crate::trust::TrustBreakdown;

/// First line of every registry file. Files are recognized by its prefix.
pub const HEADER_LINE: &str = "xTile,yTile,Hour,DOW,Freq,Hours Duration,FirstDate,LastDate";

/// Prefix checked on load.
pub const HEADER_SENTINEL: &str = "xTile";

/// Labels of the summary row.
pub const SUMMARY_LABELS: &str = "1st date/time,Last date/time,Tot days,Tot hrs,Tot locs,\
Qual locs,Tot qual hrs,Tot qual days,Qual hrs/Tot hrs %,Min xTile,Min yTile,Max xTile,\
Max yTile,#1 loc%,#2 loc%,#3 loc%,#4 loc%,#5 loc%,#6 loc%,Subject,QH/Qdays,QL/Qdays,QD/TD,\
QL km^2,QL bound km^2,km^2 Density,QL/TL,QH/TH,TRUST,Trace Cnt,Max Interval,\
Max Interval HHMMSS,Min Interval,Cumm. Trace Secs.,Traces/Day,Avg Interval,Tot Qual Trace Cnt";

/// Number of fields in the summary row.
pub const SUMMARY_FIELDS: usize = 37;

/// Number of top-location share columns.
pub const TOP_SHARES: usize = 6;

const RECORD_FIELDS: usize = 9;

// Summary row field positions.
const F_FIRST_STAMP: usize = 0;
const F_LAST_STAMP: usize = 1;
const F_TOTAL_DAYS: usize = 2;
const F_TOTAL_HOURS: usize = 3;
const F_TOTAL_LOCS: usize = 4;
const F_QUAL_LOCS: usize = 5;
const F_QUAL_HOURS: usize = 6;
const F_QUAL_DAYS: usize = 7;
const F_MIN_X: usize = 9;
const F_MIN_Y: usize = 10;
const F_MAX_X: usize = 11;
const F_MAX_Y: usize = 12;
const F_SUBJECT: usize = 19;
const F_TRUST: usize = 28;
const F_TRACE_COUNT: usize = 29;
const F_MAX_INTERVAL: usize = 30;
const F_MAX_INTERVAL_AT: usize = 31;
const F_MIN_INTERVAL: usize = 32;
const F_ELAPSED: usize = 33;
const F_QUAL_TRACE_COUNT: usize = 36;

fn config_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*zoom level=\s*(\d+)\s*,\s*seconds=\s*(\d+)\s*(?:,\s*match_key=\s*(\w+)\s*)?(?:,\s*trace_interval=\s*(\d+)\s*)?(?:,|$)",
        )
        .expect("valid config line regex")
    })
}

/// Run parameters echoed on line 2. A registry only accepts runs with the
/// same parameters it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryHeader {
    pub zoom: u8,
    pub time_in_place_secs: u32,
    pub match_key: MatchKey,
    /// Longest gap that still accumulated dwell time
    pub trace_interval_secs: u32,
}

/// Summary columns recomputed from final totals on every write. They are
/// never read back.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedColumns {
    pub qualifying_hours_pct: f64,
    /// Share of qualifying hours held by each of the six longest locations
    pub top_shares: [f64; TOP_SHARES],
    pub trust: TrustBreakdown,
    pub traces_per_day: f64,
    pub average_interval_secs: f64,
}

/// Contents of a registry file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRegistry {
    pub header: RegistryHeader,
    pub summary: RunSummary,
    pub records: Vec<LocationRecord>,
}

/// Parse a registry file.
///
/// Fails if the header sentinel is missing, the configuration echo or
/// summary row cannot be parsed, a record line is malformed, or the number
/// of records differs from the summary's qualifying-location count.
pub fn decode(text: &str) -> RegistryResult<DecodedRegistry> {
    let mut lines = text.lines();

    let first = lines.next().unwrap_or_default();
    if !first.starts_with(HEADER_SENTINEL) {
        return Err(RegistryError::BadHeader {
            found: first.chars().take(HEADER_SENTINEL.len()).collect(),
        });
    }

    let config_line = lines.next().unwrap_or_default();
    let header = parse_config_line(config_line)?;

    // Labels are informational only.
    lines.next().ok_or_else(|| malformed_summary("missing summary labels"))?;

    let row = lines
        .next()
        .ok_or_else(|| malformed_summary("missing summary row"))?;
    let (summary, expected_records) = parse_summary(row)?;

    let mut records = Vec::with_capacity(expected_records);
    for (index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_record(line, index + 5)?);
    }

    if records.len() != expected_records {
        return Err(RegistryError::RecordCountMismatch {
            expected: expected_records,
            found: records.len(),
        });
    }

    Ok(DecodedRegistry {
        header,
        summary,
        records,
    })
}

/// Render a registry file.
pub fn encode(
    header: &RegistryHeader,
    summary: &RunSummary,
    derived: &DerivedColumns,
    records: &[LocationRecord],
) -> String {
    let mut out = String::with_capacity(512 + records.len() * 64);
    out.push_str(HEADER_LINE);
    out.push('\n');
    let _ = writeln!(
        out,
        "zoom level={}, seconds={}, match_key={}, trace_interval={}, version=dwellmap {}",
        header.zoom,
        header.time_in_place_secs,
        header.match_key,
        header.trace_interval_secs,
        crate::VERSION
    );
    out.push_str(SUMMARY_LABELS);
    out.push('\n');
    out.push_str(&format_summary(summary, derived, records.len()));
    out.push('\n');
    for record in records {
        out.push_str(&format_record(record));
        out.push('\n');
    }
    out
}

fn parse_config_line(line: &str) -> RegistryResult<RegistryHeader> {
    let bad = || RegistryError::BadConfigLine {
        line: line.to_string(),
    };
    let captures = config_pattern().captures(line).ok_or_else(bad)?;
    let zoom = captures[1].parse::<u8>().map_err(|_| bad())?;
    let time_in_place_secs = captures[2].parse::<u32>().map_err(|_| bad())?;
    let match_key = match captures.get(3) {
        Some(key) => key.as_str().parse::<MatchKey>().map_err(|_| bad())?,
        None => MatchKey::Tile,
    };
    let trace_interval_secs = match captures.get(4) {
        Some(secs) => secs.as_str().parse::<u32>().map_err(|_| bad())?,
        None => DEFAULT_TRACE_INTERVAL_SECS,
    };
    Ok(RegistryHeader {
        zoom,
        time_in_place_secs,
        match_key,
        trace_interval_secs,
    })
}

fn malformed_summary(reason: impl Into<String>) -> RegistryError {
    RegistryError::MalformedSummary {
        reason: reason.into(),
    }
}

/// Parse the summary row, returning the summary and its qualifying-location
/// count.
fn parse_summary(row: &str) -> RegistryResult<(RunSummary, usize)> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != SUMMARY_FIELDS {
        return Err(malformed_summary(format!(
            "expected {} fields, found {}",
            SUMMARY_FIELDS,
            fields.len()
        )));
    }

    let stamp = |index: usize| {
        RunStamp::parse(fields[index]).ok_or_else(|| {
            malformed_summary(format!(
                "field {} is not a YYYYMMDDHHMMSS stamp: '{}'",
                index + 1,
                fields[index]
            ))
        })
    };
    let float = |index: usize| summary_float(&fields, index);
    let count = |index: usize| summary_count(&fields, index);
    let count32 = |index: usize| {
        let value = count(index)?;
        u32::try_from(value).map_err(|_| {
            malformed_summary(format!("field {} is out of range: {}", index + 1, value))
        })
    };

    let qualifying_locations = count32(F_QUAL_LOCS)? as usize;
    let bounds = if qualifying_locations > 0 {
        Some(TileBounds {
            min_x: count32(F_MIN_X)?,
            min_y: count32(F_MIN_Y)?,
            max_x: count32(F_MAX_X)?,
            max_y: count32(F_MAX_Y)?,
        })
    } else {
        None
    };

    let max_interval_at = match fields[F_MAX_INTERVAL_AT] {
        "" => None,
        at => Some(at.to_string()),
    };

    let summary = RunSummary {
        first_stamp: stamp(F_FIRST_STAMP)?,
        last_stamp: stamp(F_LAST_STAMP)?,
        total_days: count32(F_TOTAL_DAYS)?,
        total_hours: float(F_TOTAL_HOURS)?,
        total_locations: count(F_TOTAL_LOCS)?,
        qualifying_hours: float(F_QUAL_HOURS)?,
        qualifying_days: count32(F_QUAL_DAYS)?,
        bounds,
        subject: fields[F_SUBJECT].to_string(),
        trust: float(F_TRUST)?,
        trace_count: count(F_TRACE_COUNT)?,
        max_interval_secs: float(F_MAX_INTERVAL)?,
        max_interval_at,
        min_interval_secs: float(F_MIN_INTERVAL)?,
        elapsed_secs: float(F_ELAPSED)?,
        qualifying_trace_count: count(F_QUAL_TRACE_COUNT)?,
    };
    Ok((summary, qualifying_locations))
}

fn summary_float(fields: &[&str], index: usize) -> RegistryResult<f64> {
    fields[index]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            malformed_summary(format!(
                "field {} is not a number: '{}'",
                index + 1,
                fields[index]
            ))
        })
}

/// Counters are written as integers, but older files may carry them in
/// floating-point notation.
fn summary_count(fields: &[&str], index: usize) -> RegistryResult<u64> {
    let text = fields[index];
    if let Ok(value) = text.parse::<u64>() {
        return Ok(value);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value.round() as u64),
        _ => Err(malformed_summary(format!(
            "field {} is not a count: '{}'",
            index + 1,
            text
        ))),
    }
}

fn format_summary(
    summary: &RunSummary,
    derived: &DerivedColumns,
    qualifying_locations: usize,
) -> String {
    let bounds = summary.bounds.unwrap_or(TileBounds {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    });
    let trust = &derived.trust;

    let mut fields: Vec<String> = Vec::with_capacity(SUMMARY_FIELDS);
    fields.push(summary.first_stamp.to_string());
    fields.push(summary.last_stamp.to_string());
    fields.push(summary.total_days.to_string());
    fields.push(summary.total_hours.to_string());
    fields.push(summary.total_locations.to_string());
    fields.push(qualifying_locations.to_string());
    fields.push(summary.qualifying_hours.to_string());
    fields.push(summary.qualifying_days.to_string());
    fields.push(derived.qualifying_hours_pct.to_string());
    fields.push(bounds.min_x.to_string());
    fields.push(bounds.min_y.to_string());
    fields.push(bounds.max_x.to_string());
    fields.push(bounds.max_y.to_string());
    fields.extend(derived.top_shares.iter().map(f64::to_string));
    fields.push(summary.subject.clone());
    fields.push(trust.hours_per_qualifying_day.to_string());
    fields.push(trust.locations_per_qualifying_day.to_string());
    fields.push(trust.qualifying_day_fraction.to_string());
    fields.push(trust.location_area_km2.to_string());
    fields.push(trust.bound_area_km2.to_string());
    fields.push(trust.area_density.to_string());
    fields.push(trust.location_fraction.to_string());
    fields.push(trust.hours_fraction.to_string());
    fields.push(summary.trust.to_string());
    fields.push(summary.trace_count.to_string());
    fields.push(summary.max_interval_secs.to_string());
    fields.push(summary.max_interval_at.clone().unwrap_or_default());
    fields.push(summary.min_interval_secs.to_string());
    fields.push(summary.elapsed_secs.to_string());
    fields.push(derived.traces_per_day.to_string());
    fields.push(derived.average_interval_secs.to_string());
    fields.push(summary.qualifying_trace_count.to_string());

    debug_assert_eq!(fields.len(), SUMMARY_FIELDS);
    fields.join(",")
}

/// Render one record line.
pub fn format_record(record: &LocationRecord) -> String {
    format!(
        "{},{},{:02},{},{:03},{:010.6},{},{},{}",
        record.x,
        record.y,
        record.hour,
        record.day_of_week,
        record.frequency,
        record.duration_hours,
        record.trace_count,
        record.first_date.format("%Y%m%d"),
        record.last_date.format("%Y%m%d"),
    )
}

/// Parse one record line. `line` is the 1-based line number for errors.
pub fn parse_record(text: &str, line: usize) -> RegistryResult<LocationRecord> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != RECORD_FIELDS {
        return Err(RegistryError::MalformedRecord {
            line,
            reason: format!("expected {} fields, found {}", RECORD_FIELDS, fields.len()),
        });
    }

    let bad = |name: &str, value: &str| RegistryError::MalformedRecord {
        line,
        reason: format!("invalid {} '{}'", name, value),
    };

    let duration_hours = fields[5]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| bad("duration", fields[5]))?;

    Ok(LocationRecord {
        x: fields[0].parse().map_err(|_| bad("xTile", fields[0]))?,
        y: fields[1].parse().map_err(|_| bad("yTile", fields[1]))?,
        hour: fields[2].parse().map_err(|_| bad("hour", fields[2]))?,
        day_of_week: fields[3].parse().map_err(|_| bad("day of week", fields[3]))?,
        frequency: fields[4].parse().map_err(|_| bad("frequency", fields[4]))?,
        duration_hours,
        trace_count: fields[6].parse().map_err(|_| bad("trace count", fields[6]))?,
        first_date: parse_record_date(fields[7]).ok_or_else(|| bad("first date", fields[7]))?,
        last_date: parse_record_date(fields[8]).ok_or_else(|| bad("last date", fields[8]))?,
    })
}

/// Record dates are `YYYYMMDD`; registries written from dashed trace dates
/// carry `YYYY-MM-DD`.
fn parse_record_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}
