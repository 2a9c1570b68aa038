//! Custom error types for the backup runner.

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Report write error: {0}")]
    ReportWrite(String),
}

pub type Result<T> = std::result::Result<T, BackupError>;
