//! Plaintext status reports, one per destination per run.
//!
//! Each backup type gets its own report file so one destination's report
//! can never clobber the other's; see DESIGN.md for the naming decision.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::engine::{BackupType, MirrorOutcome};
use crate::utils::errors::{BackupError, Result};

/// Rendered, timestamped status record. Fixed four-line format:
///
/// ```text
/// Backup Status: Success
/// Timestamp: 2026-08-23 14:03:07
/// Destination: Bucket: important-backups
/// Backup Type: CloudStorage
/// ```
pub fn render_at(outcome: &MirrorOutcome, timestamp: DateTime<Local>) -> String {
    let status = if outcome.success { "Success" } else { "Failure" };
    format!(
        "Backup Status: {}\nTimestamp: {}\nDestination: {}\nBackup Type: {}\n",
        status,
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        outcome.destination,
        outcome.backup_type,
    )
}

fn report_file_name(backup_type: BackupType) -> &'static str {
    match backup_type {
        BackupType::RemoteServer => "backup-report-remote-server.txt",
        BackupType::CloudStorage => "backup-report-cloud-storage.txt",
    }
}

/// Render the outcome with the current local time and persist it, fully
/// replacing any report from a previous run.
pub fn write(outcome: &MirrorOutcome, report_dir: &Path) -> Result<PathBuf> {
    let path = report_dir.join(report_file_name(outcome.backup_type));
    let rendered = render_at(outcome, Local::now());

    std::fs::write(&path, rendered).map_err(|e| {
        BackupError::ReportWrite(format!("{}: {}", path.display(), e))
    })?;

    tracing::info!(report = %path.display(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn outcome(success: bool, backup_type: BackupType, destination: &str) -> MirrorOutcome {
        MirrorOutcome {
            success,
            backup_type,
            destination: destination.to_string(),
            files_transferred: 0,
            files_failed: 0,
            detail: None,
        }
    }

    #[test]
    fn renders_exact_format() {
        let at = Local.with_ymd_and_hms(2026, 8, 23, 14, 3, 7).unwrap();
        let rendered = render_at(&outcome(true, BackupType::CloudStorage, "Bucket: x"), at);

        assert_eq!(
            rendered,
            "Backup Status: Success\n\
             Timestamp: 2026-08-23 14:03:07\n\
             Destination: Bucket: x\n\
             Backup Type: CloudStorage\n"
        );
    }

    #[test]
    fn renders_failure_status() {
        let at = Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let rendered = render_at(
            &outcome(false, BackupType::RemoteServer, "Remote Server: host:/srv"),
            at,
        );

        assert!(rendered.starts_with("Backup Status: Failure\n"));
        assert!(rendered.contains("Backup Type: RemoteServer\n"));
    }

    #[test]
    fn reports_use_distinct_files_per_type() {
        let dir = TempDir::new().unwrap();

        let remote = write(
            &outcome(true, BackupType::RemoteServer, "Remote Server: h:/d"),
            dir.path(),
        )
        .unwrap();
        let cloud = write(
            &outcome(false, BackupType::CloudStorage, "Bucket: b"),
            dir.path(),
        )
        .unwrap();

        assert_ne!(remote, cloud);
        assert!(remote.exists() && cloud.exists());
    }

    #[test]
    fn rewriting_overwrites_previous_report() {
        let dir = TempDir::new().unwrap();

        write(
            &outcome(true, BackupType::CloudStorage, "Bucket: b"),
            dir.path(),
        )
        .unwrap();
        let path = write(
            &outcome(false, BackupType::CloudStorage, "Bucket: b"),
            dir.path(),
        )
        .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("Backup Status: Failure\n"));
        assert_eq!(contents.matches("Backup Status").count(), 1);
    }

    #[test]
    fn missing_report_dir_is_a_report_write_error() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("nope");

        let err = write(&outcome(true, BackupType::CloudStorage, "Bucket: b"), &gone)
            .unwrap_err();
        assert!(matches!(err, BackupError::ReportWrite(_)));
    }
}
