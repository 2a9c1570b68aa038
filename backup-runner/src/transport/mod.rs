//! Transport adapters for the supported backup destinations.

pub mod s3;
pub mod sftp;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use s3::S3Transport;
pub use sftp::SftpTransport;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Upload failed for {key}: {reason}")]
    Upload { key: String, reason: String },

    #[error("Transfer timed out after {0}s")]
    Timeout(u64),
}

impl TransportError {
    /// Whether a retry could plausibly succeed. Authentication and
    /// permission failures are terminal; retrying them only hammers the
    /// destination.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Upload { .. } | Self::Timeout(_) => true,
            Self::Authentication(_) | Self::PermissionDenied(_) | Self::NotFound(_) => false,
        }
    }
}

/// Capability set shared by every backup destination.
///
/// Uploads overwrite: a destination that already holds the key is treated as
/// success, never as a conflict, so repeated runs converge on the same
/// remote contents.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Make sure the container (remote directory or key prefix) exists.
    /// A no-op for destinations without real directories.
    async fn ensure_container(&self, path: &str) -> Result<(), TransportError>;

    /// Upload one local file under the given destination key, replacing any
    /// existing content.
    async fn put_file(&self, local_path: &Path, key: &str) -> Result<(), TransportError>;

    /// Human-readable destination description for reports and logs.
    /// Must never include credentials.
    fn describe(&self) -> String;
}
