//! Backup Runner - Main entry point
//!
//! Mirrors one local directory to an SSH server and an S3 bucket, writing a
//! status report for each destination. Both destinations are always
//! attempted; the exit code is non-zero only when both fail.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use backup_runner::{
    config::Config,
    engine::{self, BackupType, MirrorOptions, MirrorOutcome},
    report,
    transport::{S3Transport, SftpTransport},
    utils,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::from_file(&args.config)?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.log_level);
    utils::logger::init(log_level)?;

    tracing::info!(
        "Starting backup-runner v{} (source: {})",
        env!("CARGO_PKG_VERSION"),
        config.source_directory.display()
    );

    let opts = MirrorOptions {
        transfer_timeout: Duration::from_secs(config.transfer_timeout_secs),
        max_attempts: 3,
    };

    let remote_outcome = run_remote(&config, &opts).await;
    let cloud_outcome = run_cloud(&config, &opts).await;

    persist_report(&remote_outcome, &config);
    persist_report(&cloud_outcome, &config);

    if !remote_outcome.success && !cloud_outcome.success {
        anyhow::bail!("both backup destinations failed");
    }
    Ok(())
}

async fn run_remote(config: &Config, opts: &MirrorOptions) -> MirrorOutcome {
    let transport = match SftpTransport::connect(&config.remote, opts.transfer_timeout).await {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(host = %config.remote.host, error = %e, "SFTP connection failed");
            return MirrorOutcome::aborted(
                BackupType::RemoteServer,
                format!(
                    "Remote Server: {}:{}",
                    config.remote.host, config.remote.directory
                ),
                e.to_string(),
            );
        }
    };

    engine::mirror(
        &config.source_directory,
        &transport,
        BackupType::RemoteServer,
        opts,
    )
    .await
}

async fn run_cloud(config: &Config, opts: &MirrorOptions) -> MirrorOutcome {
    let transport = match S3Transport::connect(&config.cloud).await {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(bucket = %config.cloud.bucket, error = %e, "S3 client setup failed");
            return MirrorOutcome::aborted(
                BackupType::CloudStorage,
                format!("Bucket: {}", config.cloud.bucket),
                e.to_string(),
            );
        }
    };

    engine::mirror(
        &config.source_directory,
        &transport,
        BackupType::CloudStorage,
        opts,
    )
    .await
}

/// A failed report write is logged, never fatal: the other destination's
/// report must still be produced.
fn persist_report(outcome: &MirrorOutcome, config: &Config) {
    if let Err(e) = report::write(outcome, &config.report_dir) {
        tracing::error!(backup_type = %outcome.backup_type, error = %e, "report write failed");
    }
}
