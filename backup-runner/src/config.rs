//! Configuration management for the backup runner.
//!
//! Loads configuration from a TOML file; cloud credentials may be supplied
//! or overridden through `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::utils::errors::{BackupError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Local directory tree to mirror
    pub source_directory: PathBuf,

    pub remote: RemoteConfig,
    pub cloud: CloudConfig,

    /// Directory the status reports are written into
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Per-file transfer timeout in seconds
    #[serde(default = "default_transfer_timeout")]
    pub transfer_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// SSH/SFTP destination.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub host: String,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Destination directory on the remote server
    pub directory: String,

    pub username: String,

    /// Path to the SSH private key file
    pub key_path: PathBuf,
}

/// S3-compatible destination.
#[derive(Clone, Deserialize)]
pub struct CloudConfig {
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,
}

// Credentials are opaque secrets and must never end up in logs.
impl fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_transfer_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ssh_port() -> u16 {
    22
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Config {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| BackupError::Config(format!("invalid config: {}", e)))?;

        if let Ok(key_id) = std::env::var("AWS_ACCESS_KEY_ID") {
            config.cloud.access_key_id = key_id;
        }
        if let Ok(secret) = std::env::var("AWS_SECRET_ACCESS_KEY") {
            config.cloud.secret_access_key = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations with missing required fields before any
    /// transport is constructed.
    pub fn validate(&self) -> Result<()> {
        if self.source_directory.as_os_str().is_empty() {
            return Err(BackupError::Config("source_directory is empty".into()));
        }
        if self.remote.host.is_empty() {
            return Err(BackupError::Config("remote.host is empty".into()));
        }
        if self.remote.directory.is_empty() {
            return Err(BackupError::Config("remote.directory is empty".into()));
        }
        if self.remote.username.is_empty() {
            return Err(BackupError::Config("remote.username is empty".into()));
        }
        if self.remote.key_path.as_os_str().is_empty() {
            return Err(BackupError::Config("remote.key_path is empty".into()));
        }
        if self.cloud.bucket.is_empty() {
            return Err(BackupError::Config("cloud.bucket is empty".into()));
        }
        if self.cloud.access_key_id.is_empty() {
            return Err(BackupError::Config("cloud.access_key_id is empty".into()));
        }
        if self.cloud.secret_access_key.is_empty() {
            return Err(BackupError::Config("cloud.secret_access_key is empty".into()));
        }
        if self.transfer_timeout_secs == 0 {
            return Err(BackupError::Config("transfer_timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            source_directory = "/data/important"

            [remote]
            host = "backup.example.com"
            directory = "/srv/backups/important"
            username = "backup"
            key_path = "/etc/backup/id_rsa"

            [cloud]
            bucket = "important-backups"
            access_key_id = "AKIAEXAMPLE"
            secret_access_key = "secret"
        "#
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: Config = toml::from_str(sample_toml()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.remote.port, 22);
        assert_eq!(config.transfer_timeout_secs, 60);
        assert_eq!(config.cloud.region, "us-east-1");
        assert_eq!(config.report_dir, PathBuf::from("."));
    }

    #[test]
    fn rejects_empty_bucket() {
        let mut config: Config = toml::from_str(sample_toml()).unwrap();
        config.cloud.bucket.clear();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
    }

    #[test]
    fn rejects_missing_credentials() {
        let mut config: Config = toml::from_str(sample_toml()).unwrap();
        config.cloud.secret_access_key.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config: Config = toml::from_str(sample_toml()).unwrap();
        let rendered = format!("{:?}", config.cloud);

        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("AKIAEXAMPLE"));
        assert!(!rendered.contains("secret_access_key: \"secret\""));
    }
}
