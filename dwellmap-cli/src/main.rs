//! dwellmap CLI - fold one day of GPS fixes into a subject's stay-location registry.

mod error;
mod runner;

use std::path::PathBuf;

use clap::Parser;
use dwellmap::run::{run_day, RunConfig, RunReport};
use tracing::debug;

use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "dwellmap")]
#[command(about = "Build a stay-location registry from daily GPS traces", long_about = None)]
#[command(version)]
struct Args {
    /// Trace file holding one subject's fixes for one calendar day
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Subject id; the registry is written to {SUBJECT}_REGISTRY.txt
    #[arg(value_name = "SUBJECT")]
    subject: String,

    /// Slippy-map zoom level (1-21)
    #[arg(value_name = "ZOOM", value_parser = clap::value_parser!(u8).range(1..=21))]
    zoom: u8,

    /// Minimum time in place, in seconds, for an episode to count as a stay
    #[arg(value_name = "SECONDS")]
    seconds: u32,

    /// Directory holding registry files
    #[arg(long, default_value = ".")]
    registry_dir: PathBuf,

    /// Configuration file (default: ~/.dwellmap/config.ini when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() {
                error::EXIT_USAGE
            } else {
                0
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.log_file, args.debug)?;
    debug!(
        version = dwellmap::VERSION,
        input = %args.input.display(),
        zoom = args.zoom,
        seconds = args.seconds,
        "Starting run"
    );

    let config = RunConfig::new(args.input, args.subject, args.zoom, args.seconds)
        .with_config_file(runner.config())
        .with_registry_dir(args.registry_dir);

    let report = run_day(&config)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    let action = if report.created { "Created" } else { "Updated" };
    println!("{} {}", action, report.registry_path.display());
    println!("  Run:         {}", report.stamp);
    println!("  Fixes:       {}", report.stats.trace_count);
    println!(
        "  Episodes:    {} ({} qualifying, {} new, {} updated)",
        report.tally.episodes,
        report.tally.qualifying(),
        report.tally.created,
        report.tally.updated
    );
    println!("  Locations:   {}", report.locations);
    println!("  Days:        {}", report.total_days);
    println!("  Trust:       {:.4}", report.trust);
}
