//! Control-break segmentation of one day's fixes into dwell episodes.

use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use super::config::DwellConfig;
use super::episode::DwellEpisode;
use super::stats::TraceStats;
use crate::coord::{to_tile_coords, TileCoord};
use crate::trace::{Sample, TraceError, TraceResult, SECONDS_PER_DAY};

/// The tile currently being dwelled in.
#[derive(Debug)]
struct OpenVisit {
    tile: TileCoord,
    duration_secs: f64,
    sample_count: u32,
    date: NaiveDate,
    started_at: f64,
    ended_at: f64,
    entry_hour: u8,
    day_of_week: u8,
}

impl OpenVisit {
    fn enter(sample: &Sample, tile: TileCoord) -> Self {
        Self {
            tile,
            duration_secs: 0.0,
            sample_count: 1,
            date: sample.date,
            started_at: sample.day_number,
            ended_at: sample.day_number,
            entry_hour: sample.hour(),
            day_of_week: sample.day_of_week(),
        }
    }

    fn into_episode(self) -> DwellEpisode {
        DwellEpisode {
            tile: self.tile,
            duration_secs: self.duration_secs,
            sample_count: self.sample_count,
            first_date: self.date,
            last_date: self.date,
            started_at: self.started_at,
            ended_at: self.ended_at,
            entry_hour: self.entry_hour,
            day_of_week: self.day_of_week,
        }
    }
}

/// Lazily turns an ordered stream of fixes for one calendar date into
/// [`DwellEpisode`]s.
///
/// An episode is emitted every time the tile changes, carrying the stay in
/// the tile that was just left, whether or not it qualifies. At end of
/// stream the still-open stay is flushed if any time elapsed in it. A fix
/// dated differently from the first one ends the stream early.
///
/// Every gap, continuous or not, is folded into [`TraceStats`], available
/// through [`DwellSegmenter::into_stats`] once the iterator is drained. The
/// first error from the input or from tile projection is yielded once and
/// ends the iteration.
pub struct DwellSegmenter<I> {
    samples: I,
    config: DwellConfig,
    stats: TraceStats,
    day: Option<NaiveDate>,
    open: Option<OpenVisit>,
    last_time: f64,
    done: bool,
}

impl<I> DwellSegmenter<I>
where
    I: Iterator<Item = TraceResult<Sample>>,
{
    /// Create a segmenter over the given fixes.
    pub fn new(samples: I, config: DwellConfig) -> Self {
        Self {
            samples,
            config,
            stats: TraceStats::default(),
            day: None,
            open: None,
            last_time: 0.0,
            done: false,
        }
    }

    /// Consume the segmenter, returning the gathered statistics.
    pub fn into_stats(self) -> TraceStats {
        self.stats
    }

    /// Process one fix, returning the episode closed by it, if any.
    fn step(&mut self, sample: Sample) -> TraceResult<Option<DwellEpisode>> {
        let tile = to_tile_coords(sample.lat, sample.lon, self.config.zoom).map_err(|source| {
            TraceError::InvalidCoordinate {
                line: sample.line,
                source,
            }
        })?;

        let Some(open) = self.open.as_mut() else {
            debug!(tile = %tile, date = %sample.date, "First fix of the day");
            self.day = Some(sample.date);
            self.stats.trace_count += 1;
            self.last_time = sample.day_number;
            self.open = Some(OpenVisit::enter(&sample, tile));
            return Ok(None);
        };

        let mut gap_secs = (sample.day_number - self.last_time) * SECONDS_PER_DAY;
        if gap_secs < 0.0 {
            warn!(
                line = sample.line,
                gap_secs, "Fix is older than its predecessor, treating gap as zero"
            );
            gap_secs = 0.0;
        }
        let same_tile = tile == open.tile;

        if same_tile && self.config.is_continuous(gap_secs) {
            open.duration_secs += gap_secs;
        }
        self.stats.record_interval(gap_secs, || sample.hhmmss());

        // Duplicate timestamps inside one tile are simultaneous fixes, not new evidence
        if gap_secs > 0.0 || !same_tile {
            self.stats.trace_count += 1;
            if same_tile {
                open.sample_count += 1;
            }
        }

        self.last_time = sample.day_number;

        if same_tile {
            open.ended_at = sample.day_number;
            return Ok(None);
        }

        trace!(from = %open.tile, to = %tile, "Location changed");
        let left = self.open.replace(OpenVisit::enter(&sample, tile));
        Ok(left.map(OpenVisit::into_episode))
    }

    /// Close the stay still open at end of stream.
    fn flush(&mut self) -> Option<DwellEpisode> {
        let open = self.open.take()?;
        let elapsed = open.ended_at > open.started_at;
        if elapsed || self.config.qualifies(open.duration_secs) {
            Some(open.into_episode())
        } else {
            None
        }
    }
}

impl<I> Iterator for DwellSegmenter<I>
where
    I: Iterator<Item = TraceResult<Sample>>,
{
    type Item = TraceResult<DwellEpisode>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let sample = match self.samples.next() {
                Some(Ok(sample)) => sample,
                Some(Err(e)) => {
                    self.done = true;
                    self.open = None;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return self.flush().map(Ok);
                }
            };

            if let Some(day) = self.day {
                if sample.date != day {
                    debug!(
                        line = sample.line,
                        date = %sample.date,
                        "New day in trace file, ignoring the rest"
                    );
                    self.done = true;
                    return self.flush().map(Ok);
                }
            }

            match self.step(sample) {
                Ok(Some(episode)) => return Some(Ok(episode)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    self.open = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::to_tile_coords;
    use chrono::NaiveTime;

    const BASE_DAY: f64 = 39744.0;
    const HOME: (f64, f64) = (39.984702, 116.318417);
    const WORK: (f64, f64) = (39.906, 116.397);

    fn fix(at_secs: u32, (lat, lon): (f64, f64)) -> Sample {
        Sample {
            lat,
            lon,
            day_number: BASE_DAY + at_secs as f64 / SECONDS_PER_DAY,
            date: NaiveDate::from_ymd_opt(2008, 10, 23).unwrap(),
            time: NaiveTime::from_num_seconds_from_midnight_opt(at_secs, 0).unwrap(),
            line: 7 + at_secs as usize,
        }
    }

    fn segment(samples: Vec<Sample>, config: DwellConfig) -> (Vec<DwellEpisode>, TraceStats) {
        let mut segmenter = DwellSegmenter::new(samples.into_iter().map(Ok), config);
        let episodes = segmenter
            .by_ref()
            .collect::<Result<Vec<_>, _>>()
            .expect("segmentation should succeed");
        (episodes, segmenter.into_stats())
    }

    fn config() -> DwellConfig {
        DwellConfig::new(16, 3600).with_trace_interval_secs(600)
    }

    #[test]
    fn test_single_tile_two_hours_flushes_one_episode() {
        let samples = (0..=24).map(|i| fix(i * 300, HOME)).collect();
        let (episodes, stats) = segment(samples, config());

        assert_eq!(episodes.len(), 1);
        let episode = &episodes[0];
        assert_eq!(episode.tile, to_tile_coords(HOME.0, HOME.1, 16).unwrap());
        assert!((episode.duration_hours() - 2.0).abs() < 1e-6);
        assert_eq!(episode.sample_count, 25);
        assert_eq!(stats.trace_count, 25);
        assert!((stats.elapsed_hours() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_tile_change_emits_left_tile() {
        let mut samples: Vec<_> = (0..=12).map(|i| fix(i * 300, HOME)).collect();
        samples.extend((13..=20).map(|i| fix(i * 300, WORK)));
        let (episodes, _) = segment(samples, config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].tile, to_tile_coords(HOME.0, HOME.1, 16).unwrap());
        assert!((episodes[0].duration_secs - 3600.0).abs() < 1e-3);
        assert_eq!(episodes[1].tile, to_tile_coords(WORK.0, WORK.1, 16).unwrap());
        assert!((episodes[1].duration_secs - 2100.0).abs() < 1e-3);
        assert_eq!(episodes[1].entry_hour, 1);
    }

    #[test]
    fn test_revisit_produces_independent_episode() {
        let samples = vec![
            fix(0, HOME),
            fix(300, HOME),
            fix(600, WORK),
            fix(900, WORK),
            fix(1200, HOME),
            fix(1500, HOME),
        ];
        let (episodes, _) = segment(samples, config());
        let tiles: Vec<_> = episodes.iter().map(|e| e.tile).collect();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0], tiles[2]);
        assert_ne!(tiles[0], tiles[1]);
    }

    #[test]
    fn test_gap_beyond_interval_is_not_accumulated() {
        let samples = vec![fix(0, HOME), fix(300, HOME), fix(1500, HOME), fix(1800, HOME)];
        let (episodes, stats) = segment(samples, config());

        assert_eq!(episodes.len(), 1);
        assert!((episodes[0].duration_secs - 600.0).abs() < 1e-3);
        assert!((stats.elapsed_secs - 1800.0).abs() < 1e-3);
        assert!((stats.max_interval_secs - 1200.0).abs() < 1e-3);
        assert_eq!(stats.max_interval_at.as_deref(), Some("002500"));
    }

    #[test]
    fn test_duplicate_timestamps_are_not_counted() {
        let samples = vec![fix(0, HOME), fix(0, HOME), fix(60, HOME), fix(60, HOME)];
        let (episodes, stats) = segment(samples, config());
        assert_eq!(stats.trace_count, 2);
        assert_eq!(episodes[0].sample_count, 2);
        assert_eq!(stats.min_interval_secs.map(|s| s.round()), Some(60.0));
    }

    #[test]
    fn test_zero_elapsed_single_tile_emits_nothing() {
        let samples = vec![fix(0, HOME), fix(0, HOME)];
        let (episodes, _) = segment(samples, config());
        assert!(episodes.is_empty());
    }

    #[test]
    fn test_last_fix_in_new_tile_is_not_flushed() {
        let samples = vec![fix(0, HOME), fix(300, HOME), fix(600, WORK)];
        let (episodes, _) = segment(samples, config());
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].tile, to_tile_coords(HOME.0, HOME.1, 16).unwrap());
    }

    #[test]
    fn test_new_day_stops_processing() {
        let mut late = fix(600, WORK);
        late.date = NaiveDate::from_ymd_opt(2008, 10, 24).unwrap();
        let samples = vec![fix(0, HOME), fix(300, HOME), late, fix(900, WORK)];
        let (episodes, stats) = segment(samples, config());

        assert_eq!(episodes.len(), 1);
        assert_eq!(stats.trace_count, 2);
        assert_eq!(episodes[0].tile, to_tile_coords(HOME.0, HOME.1, 16).unwrap());
    }

    #[test]
    fn test_input_error_ends_iteration() {
        let items = vec![
            Ok(fix(0, HOME)),
            Err(TraceError::MalformedRow {
                line: 8,
                reason: "bad".to_string(),
            }),
            Ok(fix(300, HOME)),
        ];
        let mut segmenter = DwellSegmenter::new(items.into_iter(), config());
        assert!(matches!(
            segmenter.next(),
            Some(Err(TraceError::MalformedRow { line: 8, .. }))
        ));
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn test_entry_hour_comes_from_first_fix() {
        let samples = vec![fix(3 * 3600 + 59 * 60, HOME), fix(4 * 3600 + 5 * 60, HOME)];
        let (episodes, _) = segment(samples, config());
        assert_eq!(episodes[0].entry_hour, 3);
        assert_eq!(episodes[0].day_of_week, 4);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_duration_is_independent_of_sampling(
                gaps in proptest::collection::vec(1u32..=600, 1..60)
            ) {
                let mut at = 0u32;
                let mut samples = vec![fix(at, HOME)];
                for gap in &gaps {
                    at += gap;
                    samples.push(fix(at, HOME));
                }

                let (episodes, _) = segment(samples, config());
                prop_assert_eq!(episodes.len(), 1);
                let expected: u32 = gaps.iter().sum();
                prop_assert!((episodes[0].duration_secs - expected as f64).abs() < 0.01);
            }
        }
    }
}
