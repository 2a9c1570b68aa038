//! Console logging for backup runs.
//!
//! A mirror run is a short-lived batch process, so a single stderr-style
//! fmt subscriber is enough; the per-destination reports are the durable
//! record, not the log.

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber. Called once from main, before the
/// first mirror run starts.
pub fn init(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(level))
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging init: {}", e))?;
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn resolve_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_from(level))
}

/// Build a filter from the configured level, falling back to `info` when
/// the value does not parse as a directive.
fn filter_from(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
