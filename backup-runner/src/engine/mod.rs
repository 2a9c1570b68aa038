//! Mirror operation: one full pass uploading a local tree to one destination.
//!
//! Failures on individual files are logged and counted, never fatal; the run
//! keeps going and reports an aggregate outcome. Errors from the enumerator
//! or the transport stop at this boundary.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};
use std::time::Duration;

use crate::fs::{FileEntry, FileWalker};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupType {
    RemoteServer,
    CloudStorage,
}

impl fmt::Display for BackupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteServer => write!(f, "RemoteServer"),
            Self::CloudStorage => write!(f, "CloudStorage"),
        }
    }
}

/// Aggregate result of one mirror run against one destination.
#[derive(Debug, Clone)]
pub struct MirrorOutcome {
    pub success: bool,
    pub backup_type: BackupType,
    pub destination: String,
    pub files_transferred: usize,
    pub files_failed: usize,
    /// First error observed, kept for diagnostics
    pub detail: Option<String>,
}

impl MirrorOutcome {
    /// Outcome for a run that never started (construction failure, bad
    /// config): failed, zero files touched.
    pub fn aborted(backup_type: BackupType, destination: String, detail: String) -> Self {
        Self {
            success: false,
            backup_type,
            destination,
            files_transferred: 0,
            files_failed: 0,
            detail: Some(detail),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Bound on each individual transfer call
    pub transfer_timeout: Duration,

    /// Total attempts per file, retrying only transient transport errors
    pub max_attempts: u32,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            transfer_timeout: Duration::from_secs(60),
            max_attempts: 3,
        }
    }
}

/// Destination key for a file entry: its relative path with `/` separators.
/// Rejects anything that would escape the destination root.
fn destination_key(entry: &FileEntry) -> Option<String> {
    let mut parts = Vec::new();
    for component in entry.relative_path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?.to_string()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Ancestor prefixes of a key, shallowest first. The empty string stands for
/// the destination root itself.
fn container_prefixes(key: &str) -> Vec<String> {
    let mut prefixes = vec![String::new()];
    let mut current = String::new();
    let mut parts = key.split('/').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            break; // last component is the file itself
        }
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(part);
        prefixes.push(current.clone());
    }
    prefixes
}

async fn put_with_retry(
    transport: &dyn Transport,
    entry: &FileEntry,
    key: &str,
    opts: &MirrorOptions,
) -> Result<(), TransportError> {
    let mut attempt = 1;
    loop {
        // This bounds the await, not the transport's own work: a blocking
        // SFTP call keeps running after the deadline and must be limited by
        // the session timeout set at connect time.
        let result = match tokio::time::timeout(
            opts.transfer_timeout,
            transport.put_file(&entry.absolute_path, key),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(opts.transfer_timeout.as_secs())),
        };

        match result {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && attempt < opts.max_attempts => {
                let backoff = Duration::from_millis(500 * (1 << (attempt - 1)));
                tracing::warn!(key, attempt, error = %e, "transfer failed, retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Mirror every regular file under `root` to `transport`.
pub async fn mirror(
    root: &Path,
    transport: &dyn Transport,
    backup_type: BackupType,
    opts: &MirrorOptions,
) -> MirrorOutcome {
    let destination = transport.describe();

    let walker = match FileWalker::new(root) {
        Ok(walker) => walker,
        Err(e) => {
            tracing::error!(root = %root.display(), error = %e, "cannot enumerate source");
            return MirrorOutcome::aborted(backup_type, destination, e.to_string());
        }
    };

    let mut ensured: HashSet<String> = HashSet::new();
    let mut transferred = 0usize;
    let mut failed = 0usize;
    let mut detail: Option<String> = None;
    let note_failure = |detail: &mut Option<String>, message: String| {
        tracing::warn!("{}", message);
        if detail.is_none() {
            *detail = Some(message);
        }
    };

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                failed += 1;
                note_failure(&mut detail, format!("enumeration error: {}", e));
                continue;
            }
        };

        let key = match destination_key(&entry) {
            Some(key) => key,
            None => {
                failed += 1;
                note_failure(
                    &mut detail,
                    format!("unusable path: {}", entry.relative_path.display()),
                );
                continue;
            }
        };

        let mut container_ok = true;
        for prefix in container_prefixes(&key) {
            if !ensured.insert(prefix.clone()) {
                continue;
            }
            if let Err(e) = transport.ensure_container(&prefix).await {
                // Allow a later file in the same container to try again
                ensured.remove(&prefix);
                note_failure(&mut detail, format!("ensure container '{}': {}", prefix, e));
                container_ok = false;
                break;
            }
        }
        if !container_ok {
            failed += 1;
            continue;
        }

        match put_with_retry(transport, &entry, &key, opts).await {
            Ok(()) => {
                tracing::debug!(key, "transferred");
                transferred += 1;
            }
            Err(e) => {
                failed += 1;
                note_failure(&mut detail, format!("upload '{}': {}", key, e));
            }
        }
    }

    let success = failed == 0;
    tracing::info!(
        destination = %destination,
        transferred,
        failed,
        success,
        "mirror run finished"
    );

    MirrorOutcome {
        success,
        backup_type,
        destination,
        files_transferred: transferred,
        files_failed: failed,
        detail,
    }
}
