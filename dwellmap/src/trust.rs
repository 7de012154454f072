//! Trust scoring.
//!
//! Condenses a subject's registry totals into one confidence value. Each of
//! six observed ratios is divided by a population reference (mean plus one
//! standard deviation), and the normalized values are averaged with equal
//! weight. The score is not clamped, so a subject well above the references
//! can exceed 1.

use crate::registry::{ratio, RunSummary, TileBounds};

/// Weight of each of the six sub-scores.
pub const COMPONENT_WEIGHT: f64 = 1.0 / 6.0;

/// Zoom level at which [`TrustConfig::tile_length_km`] is measured.
pub const REFERENCE_ZOOM: u8 = 16;

/// Reference constants and gates for the trust score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustConfig {
    /// Qualifying hours per qualifying day
    pub qualifying_hours_per_day: f64,
    /// Qualifying locations per qualifying day
    pub qualifying_locations_per_day: f64,
    /// Qualifying days over total days
    pub qualifying_day_fraction: f64,
    /// Qualifying locations over total location changes
    pub qualifying_location_fraction: f64,
    /// Qualifying hours over total hours
    pub qualifying_hours_fraction: f64,
    /// Qualifying tile area over bounding-box area
    pub area_density: f64,
    /// Edge length of one tile at zoom 16, in km
    pub tile_length_km: f64,
    /// Bounding boxes this large or larger score zero
    pub max_bound_area_km2: f64,
    /// Fewer qualifying locations than this score zero
    pub min_locations: usize,
    /// Scores are scaled down linearly until this many days are observed
    pub ramp_days: u32,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            qualifying_hours_per_day: 2.49,
            qualifying_locations_per_day: 0.93,
            qualifying_day_fraction: 0.17,
            qualifying_location_fraction: 0.003,
            qualifying_hours_fraction: 0.102,
            area_density: 0.40,
            tile_length_km: 0.469,
            max_bound_area_km2: 1000.0,
            min_locations: 3,
            ramp_days: 30,
        }
    }
}

/// Observed ratios behind a trust score, as written to the summary row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrustBreakdown {
    pub hours_per_qualifying_day: f64,
    pub locations_per_qualifying_day: f64,
    pub qualifying_day_fraction: f64,
    /// Area covered by qualifying tiles, km²
    pub location_area_km2: f64,
    /// Area of the qualifying bounding box, km²
    pub bound_area_km2: f64,
    pub area_density: f64,
    pub location_fraction: f64,
    pub hours_fraction: f64,
    pub score: f64,
}

/// Computes trust scores at one zoom level.
#[derive(Debug, Clone)]
pub struct TrustScorer {
    config: TrustConfig,
    zoom: u8,
}

impl TrustScorer {
    pub fn new(config: TrustConfig, zoom: u8) -> Self {
        Self { config, zoom }
    }

    /// Tile edge length at the scorer's zoom, halving per zoom level.
    pub fn tile_length_km(&self) -> f64 {
        let shift = REFERENCE_ZOOM as i32 - self.zoom as i32;
        self.config.tile_length_km * 2f64.powi(shift)
    }

    /// Area of `count` tiles.
    pub fn location_area_km2(&self, count: usize) -> f64 {
        let length = self.tile_length_km();
        count as f64 * length * length
    }

    /// Area of the inclusive bounding box, zero when there is none.
    pub fn bound_area_km2(&self, bounds: Option<&TileBounds>) -> f64 {
        let length = self.tile_length_km();
        bounds.map_or(0.0, |b| {
            (b.width() as f64 * length) * (b.height() as f64 * length)
        })
    }

    /// Compute the observed ratios and the resulting score.
    pub fn evaluate(&self, summary: &RunSummary, qualifying_locations: usize) -> TrustBreakdown {
        let qual_locs = qualifying_locations as f64;
        let qual_days = summary.qualifying_days as f64;
        let total_days = summary.total_days as f64;
        let location_area_km2 = self.location_area_km2(qualifying_locations);
        let bound_area_km2 = self.bound_area_km2(summary.bounds.as_ref());

        let mut breakdown = TrustBreakdown {
            hours_per_qualifying_day: ratio(summary.qualifying_hours, qual_days),
            locations_per_qualifying_day: ratio(qual_locs, qual_days),
            qualifying_day_fraction: ratio(qual_days, total_days),
            location_area_km2,
            bound_area_km2,
            area_density: ratio(location_area_km2, bound_area_km2),
            location_fraction: ratio(qual_locs, summary.total_locations as f64),
            hours_fraction: ratio(summary.qualifying_hours, summary.total_hours),
            score: 0.0,
        };

        let eligible = summary.total_days > 0
            && qualifying_locations >= self.config.min_locations
            && bound_area_km2 < self.config.max_bound_area_km2;
        if !eligible {
            return breakdown;
        }

        let c = &self.config;
        let components = [
            ratio(breakdown.hours_per_qualifying_day, c.qualifying_hours_per_day),
            ratio(breakdown.locations_per_qualifying_day, c.qualifying_locations_per_day),
            ratio(breakdown.qualifying_day_fraction, c.qualifying_day_fraction),
            ratio(breakdown.location_fraction, c.qualifying_location_fraction),
            ratio(breakdown.hours_fraction, c.qualifying_hours_fraction),
            ratio(breakdown.area_density, c.area_density),
        ];
        let mut score: f64 = components.iter().map(|v| v * COMPONENT_WEIGHT).sum();

        if summary.total_days < c.ramp_days {
            score *= total_days / c.ramp_days as f64;
        }
        breakdown.score = score;
        breakdown
    }

    /// The trust score alone.
    pub fn score(&self, summary: &RunSummary, qualifying_locations: usize) -> f64 {
        self.evaluate(summary, qualifying_locations).score
    }
}
