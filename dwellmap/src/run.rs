//! One daily run: fold a trace file into its subject's registry.
//!
//! The registry is loaded and checked against the run parameters, the
//! trace is segmented into dwell episodes which are merged one by one, and
//! the registry is then scored, sorted and written back. Nothing is written
//! unless every check passes.

use std::iter;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::coord::{MAX_ZOOM, MIN_ZOOM};
use crate::dwell::{DwellConfig, DwellSegmenter, TraceStats};
use crate::error::{RunError, RunResult};
use crate::registry::{
    KeyPolicy, LocationMerger, LocationRegistry, MergeTally, RegistryHeader, RegistryStore,
    RegistryWriter, RunStamp, RunSummary, DEFAULT_CAPACITY,
};
use crate::trace::{Sample, TraceError, TraceReader};
use crate::trust::{TrustConfig, TrustScorer};

/// Everything a daily run needs to know.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Trace file for one subject and one calendar day
    pub input: PathBuf,
    /// Subject id; names the registry file and is written to the summary
    pub subject: String,
    /// Directory holding `{subject}_REGISTRY.txt`
    pub registry_dir: PathBuf,
    pub dwell: DwellConfig,
    pub capacity: usize,
    pub key_policy: KeyPolicy,
    pub trust: TrustConfig,
}

impl RunConfig {
    /// Config with default settings and the registry in the current directory.
    pub fn new(
        input: impl Into<PathBuf>,
        subject: impl Into<String>,
        zoom: u8,
        time_in_place_secs: u32,
    ) -> Self {
        Self {
            input: input.into(),
            subject: subject.into(),
            registry_dir: PathBuf::from("."),
            dwell: DwellConfig::new(zoom, time_in_place_secs),
            capacity: DEFAULT_CAPACITY,
            key_policy: KeyPolicy::default(),
            trust: TrustConfig::default(),
        }
    }

    /// Apply the settings of a config file.
    pub fn with_config_file(mut self, file: &ConfigFile) -> Self {
        self.dwell = self
            .dwell
            .with_trace_interval_secs(file.dwell.trace_interval_secs);
        self.capacity = file.registry.capacity;
        self.key_policy = file.registry.key_policy();
        self.trust = file.trust;
        self
    }

    pub fn with_registry_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.registry_dir = dir.into();
        self
    }

    /// Store holding this subject's registry.
    pub fn registry_store(&self) -> RegistryStore {
        RegistryStore::for_subject(&self.registry_dir, &self.subject)
    }

    fn header(&self) -> RegistryHeader {
        RegistryHeader {
            zoom: self.dwell.zoom,
            time_in_place_secs: self.dwell.time_in_place_secs,
            match_key: self.key_policy.match_key,
            trace_interval_secs: self.dwell.trace_interval_secs,
        }
    }

    fn validate(&self) -> RunResult<()> {
        let zoom = self.dwell.zoom;
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(RunError::InvalidArguments(format!(
                "zoom level {} is outside {}..={}",
                zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }
        if self.subject.is_empty()
            || self
                .subject
                .contains(|c: char| c == ',' || c == '/' || c == '\\' || c.is_control())
        {
            return Err(RunError::InvalidArguments(format!(
                "subject '{}' must be non-empty without commas or path separators",
                self.subject
            )));
        }
        Ok(())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub registry_path: PathBuf,
    pub stamp: RunStamp,
    /// Whether this run created the registry
    pub created: bool,
    pub tally: MergeTally,
    /// Interval statistics of this day's trace
    pub stats: TraceStats,
    /// Locations in the registry after the run
    pub locations: usize,
    pub total_days: u32,
    pub trust: f64,
}

/// Stamp of the run: the trace file stem when it is a `YYYYMMDDHHMMSS`
/// stamp, otherwise the first fix's date and time.
pub fn run_stamp(input: &Path, first: &Sample) -> RunStamp {
    let from_name = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(RunStamp::parse);
    match from_name {
        Some(stamp) => {
            if stamp.date() != first.date {
                warn!(
                    stamp = %stamp,
                    first_fix = %first.date,
                    "Trace file name and first fix disagree on the date"
                );
            }
            stamp
        }
        None => RunStamp::from_date_time(first.date, first.time),
    }
}

/// Reject a run whose parameters differ from those the registry was built with.
fn check_header(registry: &RegistryHeader, requested: &RegistryHeader) -> RunResult<()> {
    if registry.zoom != requested.zoom {
        return Err(RunError::ZoomMismatch {
            registry: registry.zoom,
            requested: requested.zoom,
        });
    }
    if registry.time_in_place_secs != requested.time_in_place_secs {
        return Err(RunError::DurationMismatch {
            registry: registry.time_in_place_secs,
            requested: requested.time_in_place_secs,
        });
    }
    if registry.match_key != requested.match_key {
        return Err(RunError::SettingMismatch {
            setting: "match key",
            registry: registry.match_key.to_string(),
            requested: requested.match_key.to_string(),
        });
    }
    if registry.trace_interval_secs != requested.trace_interval_secs {
        return Err(RunError::SettingMismatch {
            setting: "trace interval",
            registry: format!("{} seconds", registry.trace_interval_secs),
            requested: format!("{} seconds", requested.trace_interval_secs),
        });
    }
    Ok(())
}

/// Process one trace file against its subject's registry.
pub fn run_day(config: &RunConfig) -> RunResult<RunReport> {
    config.validate()?;

    let store = config.registry_store();
    let mut samples = TraceReader::open(&config.input)?;
    let loaded = store.load()?;

    if let Some(existing) = &loaded {
        check_header(&existing.header, &config.header())?;
    }

    let first = samples.next().ok_or(TraceError::Empty)??;
    let stamp = run_stamp(&config.input, &first);

    let created = loaded.is_none();
    let (mut registry, mut summary) = match loaded {
        Some(existing) => {
            if stamp.date() <= existing.summary.last_stamp.date() {
                return Err(RunError::OutOfOrder {
                    run: stamp,
                    last: existing.summary.last_stamp,
                });
            }
            let registry = LocationRegistry::from_records(
                existing.records,
                config.capacity,
                config.key_policy,
            )?;
            (registry, existing.summary)
        }
        None => (
            LocationRegistry::new(config.capacity, config.key_policy),
            RunSummary::new(stamp.clone(), config.subject.clone()),
        ),
    };
    summary.subject = config.subject.clone();

    info!(
        subject = %config.subject,
        stamp = %stamp,
        input = %config.input.display(),
        locations = registry.len(),
        "Processing trace"
    );

    let mut segmenter = DwellSegmenter::new(iter::once(Ok(first)).chain(samples), config.dwell);
    let (tally, qualified) = {
        let mut merger = LocationMerger::new(&mut registry, &mut summary, config.dwell);
        for episode in segmenter.by_ref() {
            merger.merge(&episode?)?;
        }
        (merger.tally(), merger.qualified_today())
    };
    let stats = segmenter.into_stats();
    debug!(
        episodes = tally.episodes,
        qualifying = tally.qualifying(),
        fixes = stats.trace_count,
        "Segmentation finished"
    );

    summary.record_day(stamp.clone(), &stats, qualified);

    let scorer = TrustScorer::new(config.trust, config.dwell.zoom);
    let contents =
        RegistryWriter::new(&scorer, config.header()).render(&mut registry, &mut summary);
    store.persist(&contents)?;

    info!(
        subject = %config.subject,
        locations = registry.len(),
        created = tally.created,
        updated = tally.updated,
        days = summary.total_days,
        trust = summary.trust,
        "Run complete"
    );

    Ok(RunReport {
        registry_path: store.path().to_path_buf(),
        stamp,
        created,
        tally,
        stats,
        locations: registry.len(),
        total_days: summary.total_days,
        trust: summary.trust,
    })
}
