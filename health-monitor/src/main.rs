//! Health Monitor - Main entry point
//!
//! Takes one sample of CPU, memory, disk, and process-count metrics and logs
//! a warning for every threshold breach, then exits.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use health_monitor::{checks, logger, sampler, Thresholds};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a thresholds TOML file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file receiving a copy of every alert
    #[arg(long, default_value = "system-health.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let thresholds = match &args.config {
        Some(path) => Thresholds::from_file(path)?,
        None => Thresholds::default(),
    };

    let _guard = logger::init(&args.log_level, &args.log_file)?;

    let snapshot = sampler::sample();
    tracing::debug!(?snapshot, "sampled system metrics");

    for alert in checks::evaluate(&snapshot, &thresholds) {
        tracing::warn!("{}", alert.message);
    }

    Ok(())
}
