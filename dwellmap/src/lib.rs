//! dwellmap - stay-location registry built from daily GPS traces
//!
//! Each run reads one subject's fixes for one calendar day, projects them
//! onto slippy-map tiles, finds the places where the subject dwelled for at
//! least a configured time, and folds those places into a registry file that
//! persists across runs. The registry carries running totals and a trust
//! score describing how consistent the subject's location pattern is.
//!
//! # Example
//!
//! ```no_run
//! use dwellmap::run::{run_day, RunConfig};
//!
//! let config = RunConfig::new("20081023025304.plt", "000", 16, 3600)
//!     .with_registry_dir("registries");
//! let report = run_day(&config)?;
//! println!("{} locations, trust {}", report.locations, report.trust);
//! # Ok::<(), dwellmap::error::RunError>(())
//! ```

pub mod config;
pub mod coord;
pub mod dwell;
pub mod error;
pub mod logging;
pub mod registry;
pub mod run;
pub mod trace;
pub mod trust;

/// Version string written to every registry file.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
