//! Final ordering and derived columns before a registry is persisted.

use super::codec::{self, DerivedColumns, RegistryHeader, TOP_SHARES};
use super::merge::LocationRegistry;
use super::record::LocationRecord;
use super::summary::{ratio, RunSummary};
use crate::trust::TrustScorer;

/// Share of qualifying hours held by each of the six longest locations, as
/// percentages. `records` must already be sorted; missing places are zero.
pub fn top_shares(records: &[LocationRecord], qualifying_hours: f64) -> [f64; TOP_SHARES] {
    let mut shares = [0.0; TOP_SHARES];
    for (share, record) in shares.iter_mut().zip(records) {
        *share = ratio(record.duration_hours, qualifying_hours) * 100.0;
    }
    shares
}

/// Sorts the registry, recomputes derived columns and scores trust.
pub struct RegistryWriter<'a> {
    scorer: &'a TrustScorer,
    header: RegistryHeader,
}

impl<'a> RegistryWriter<'a> {
    pub fn new(scorer: &'a TrustScorer, header: RegistryHeader) -> Self {
        Self { scorer, header }
    }

    /// Prepare the registry for writing and render it.
    ///
    /// Sorts `registry` by descending duration and stores the fresh trust
    /// score in `summary`.
    pub fn render(&self, registry: &mut LocationRegistry, summary: &mut RunSummary) -> String {
        registry.sort_by_duration();
        let derived = self.derive(registry.records(), summary);
        summary.trust = derived.trust.score;
        codec::encode(&self.header, summary, &derived, registry.records())
    }

    /// Derived summary columns for sorted `records`.
    pub fn derive(&self, records: &[LocationRecord], summary: &RunSummary) -> DerivedColumns {
        DerivedColumns {
            qualifying_hours_pct: summary.qualifying_hours_pct(),
            top_shares: top_shares(records, summary.qualifying_hours),
            trust: self.scorer.evaluate(summary, records.len()),
            traces_per_day: summary.traces_per_day(),
            average_interval_secs: summary.average_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::dwell::DwellEpisode;
    use crate::registry::{KeyPolicy, MatchKey, RunStamp};
    use crate::trust::TrustConfig;
    use chrono::NaiveDate;

    fn registry_with(hours: &[f64]) -> LocationRegistry {
        let date = NaiveDate::from_ymd_opt(2008, 10, 23).unwrap();
        let mut registry = LocationRegistry::new(100, KeyPolicy::default());
        for (i, h) in hours.iter().enumerate() {
            let episode = DwellEpisode {
                tile: TileCoord::new(i as u32, 0, 16),
                duration_secs: h * 3600.0,
                sample_count: 1,
                first_date: date,
                last_date: date,
                started_at: 0.0,
                ended_at: 0.0,
                entry_hour: 0,
                day_of_week: 4,
            };
            registry.upsert(&episode).unwrap();
        }
        registry
    }

    #[test]
    fn test_top_shares_fill_missing_with_zero() {
        let registry = registry_with(&[3.0, 1.0]);
        let shares = top_shares(registry.records(), 4.0);
        assert_eq!(shares, [75.0, 25.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_top_shares_zero_hours() {
        assert_eq!(top_shares(&[], 0.0), [0.0; TOP_SHARES]);
    }

    #[test]
    fn test_render_sorts_and_scores() {
        let mut registry = registry_with(&[1.0, 4.0, 2.0]);
        let mut summary = RunSummary::new(RunStamp::parse("20081023000000").unwrap(), "000");
        summary.total_days = 1;
        summary.qualifying_days = 1;
        summary.qualifying_hours = 7.0;
        summary.total_hours = 12.0;
        summary.total_locations = 40;
        for x in 0..3 {
            summary.include_tile(x, 0);
        }
        summary.trust = -1.0;

        let scorer = TrustScorer::new(TrustConfig::default(), 16);
        let header = RegistryHeader {
            zoom: 16,
            time_in_place_secs: 3600,
            match_key: MatchKey::Tile,
            trace_interval_secs: 600,
        };
        let text = RegistryWriter::new(&scorer, header).render(&mut registry, &mut summary);

        let durations: Vec<f64> = registry.records().iter().map(|r| r.duration_hours).collect();
        assert_eq!(durations, vec![4.0, 2.0, 1.0]);
        assert!(summary.trust > 0.0);
        assert_eq!(summary.trust, scorer.score(&summary, 3));

        let decoded = codec::decode(&text).unwrap();
        assert_eq!(decoded.summary, summary);
        assert_eq!(decoded.records, registry.records());
    }
}
