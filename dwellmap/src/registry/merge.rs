//! Folding dwell episodes into the registry.

use tracing::{debug, trace};

use super::error::{RegistryError, RegistryResult};
use super::record::{KeyPolicy, LocationRecord};
use super::summary::RunSummary;
use crate::dwell::{DwellConfig, DwellEpisode};

/// Default upper bound on the number of locations a registry may hold.
pub const DEFAULT_CAPACITY: usize = 1000;

/// The ordered, capacity-bounded list of a subject's stay locations.
///
/// Records stay in discovery order until [`LocationRegistry::sort_by_duration`]
/// is called before writing.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    records: Vec<LocationRecord>,
    capacity: usize,
    policy: KeyPolicy,
}

impl LocationRegistry {
    /// Create an empty registry.
    pub fn new(capacity: usize, policy: KeyPolicy) -> Self {
        Self {
            records: Vec::new(),
            capacity,
            policy,
        }
    }

    /// Adopt records loaded from disk.
    ///
    /// Fails if there are already more records than `capacity` allows.
    pub fn from_records(
        records: Vec<LocationRecord>,
        capacity: usize,
        policy: KeyPolicy,
    ) -> RegistryResult<Self> {
        if records.len() > capacity {
            return Err(RegistryError::CapacityExceededAtLoad {
                capacity,
                found: records.len(),
            });
        }
        Ok(Self {
            records,
            capacity,
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Index of the first record the episode merges into.
    pub fn find(&self, episode: &DwellEpisode) -> Option<usize> {
        self.records
            .iter()
            .position(|record| self.policy.matches(record, episode))
    }

    /// Merge a qualifying episode into its record, or append a new one.
    pub fn upsert(&mut self, episode: &DwellEpisode) -> RegistryResult<MergeOutcome> {
        if let Some(index) = self.find(episode) {
            self.records[index].absorb(episode, &self.policy);
            return Ok(MergeOutcome::Updated(index));
        }

        if self.records.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.records
            .push(LocationRecord::from_episode(episode, &self.policy));
        Ok(MergeOutcome::Created(self.records.len() - 1))
    }

    /// Order records by descending total duration. Ties keep discovery
    /// order.
    pub fn sort_by_duration(&mut self) {
        self.records
            .sort_by(|a, b| b.duration_hours.total_cmp(&a.duration_hours));
    }

    pub fn into_records(self) -> Vec<LocationRecord> {
        self.records
    }
}

/// What happened to one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Below the time-in-place threshold; only the location counter moved.
    Discarded,
    /// Folded into the existing record at this index.
    Updated(usize),
    /// Appended as a new record at this index.
    Created(usize),
}

/// Counts of merge outcomes over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeTally {
    pub episodes: usize,
    pub discarded: usize,
    pub updated: usize,
    pub created: usize,
}

impl MergeTally {
    /// Episodes that met the time-in-place threshold.
    pub fn qualifying(&self) -> usize {
        self.updated + self.created
    }

    fn count(&mut self, outcome: MergeOutcome) {
        self.episodes += 1;
        match outcome {
            MergeOutcome::Discarded => self.discarded += 1,
            MergeOutcome::Updated(_) => self.updated += 1,
            MergeOutcome::Created(_) => self.created += 1,
        }
    }
}

/// Applies one day's episodes to a registry and its running summary.
///
/// Every episode counts as a location change. Qualifying episodes also
/// update the matching record, the qualifying totals and the bounding box,
/// and mark the day as a qualifying day.
pub struct LocationMerger<'a> {
    registry: &'a mut LocationRegistry,
    summary: &'a mut RunSummary,
    dwell: DwellConfig,
    qualified_today: bool,
    tally: MergeTally,
}

impl<'a> LocationMerger<'a> {
    pub fn new(
        registry: &'a mut LocationRegistry,
        summary: &'a mut RunSummary,
        dwell: DwellConfig,
    ) -> Self {
        Self {
            registry,
            summary,
            dwell,
            qualified_today: false,
            tally: MergeTally::default(),
        }
    }

    /// Fold one episode in.
    pub fn merge(&mut self, episode: &DwellEpisode) -> RegistryResult<MergeOutcome> {
        self.summary.total_locations += 1;

        if !self.dwell.qualifies(episode.duration_secs) {
            trace!(
                tile = %episode.tile,
                secs = episode.duration_secs,
                "Episode below time in place"
            );
            self.tally.count(MergeOutcome::Discarded);
            return Ok(MergeOutcome::Discarded);
        }

        let outcome = self.registry.upsert(episode)?;
        debug!(
            tile = %episode.tile,
            hours = episode.duration_hours(),
            samples = episode.sample_count,
            ?outcome,
            "Merged qualifying episode"
        );

        self.summary.qualifying_hours += episode.duration_hours();
        self.summary.qualifying_trace_count += episode.sample_count as u64;
        self.summary.include_tile(episode.tile.x, episode.tile.y);
        self.qualified_today = true;
        self.tally.count(outcome);
        Ok(outcome)
    }

    /// Whether any merged episode qualified.
    pub fn qualified_today(&self) -> bool {
        self.qualified_today
    }

    pub fn tally(&self) -> MergeTally {
        self.tally
    }
}
