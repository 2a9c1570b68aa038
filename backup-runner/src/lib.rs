//! Backup Runner Library
//!
//! One-shot mirroring of a local directory tree to a remote SSH server and an
//! S3-compatible bucket, with a plaintext status report per destination.

pub mod config;
pub mod engine;
pub mod fs;
pub mod report;
pub mod transport;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{BackupType, MirrorOutcome};
pub use utils::errors::BackupError;
pub type Result<T> = std::result::Result<T, BackupError>;
