//! S3-compatible object storage transport.
//!
//! Works against AWS S3 and S3-compatible providers (MinIO, R2, ...) when an
//! endpoint URL is configured.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream, Client};

use super::{Transport, TransportError};
use crate::config::CloudConfig;

pub struct S3Transport {
    client: Client,
    bucket: String,
}

impl S3Transport {
    /// Build one client bound to the configured credential pair.
    pub async fn connect(cloud: &CloudConfig) -> Result<Self, TransportError> {
        let credentials = Credentials::new(
            cloud.access_key_id.clone(),
            cloud.secret_access_key.clone(),
            None,
            None,
            "backup-runner",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(cloud.region.clone()));
        if let Some(endpoint) = &cloud.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let config = loader.load().await;

        Ok(Self {
            client: Client::new(&config),
            bucket: cloud.bucket.clone(),
        })
    }
}

#[async_trait]
impl Transport for S3Transport {
    /// Object storage has no real directories; prefixes come into existence
    /// with the first object that uses them.
    async fn ensure_container(&self, _path: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn put_file(&self, local_path: &Path, key: &str) -> Result<(), TransportError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| TransportError::Upload {
                key: key.to_string(),
                reason: format!("read {}: {}", local_path.display(), e),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("Bucket: {}", self.bucket)
    }
}
