//! Durable artifact storage for generated comic bitmaps.
//!
//! The S3 implementation uploads the bytes and hands back a presigned GET
//! URL; the bucket has no public-read mode, so the URL TTL must cover the
//! cache validity window plus a safety margin (the pipeline passes cache
//! TTL + 1 hour).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;

/// Errors from the artifact store layer.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("Upload failed for '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("Presign failed for '{key}': {message}")]
    Presign { key: String, message: String },

    #[error("Delete failed for '{key}': {message}")]
    Delete { key: String, message: String },
}

/// Durable object store for comic bitmaps.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key` and return an externally fetchable URL.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CloudError>;

    /// Remove the object under `key`. Used by takedown and the expiry
    /// sweep.
    async fn delete(&self, key: &str) -> Result<(), CloudError>;
}

/// S3-backed artifact store issuing presigned GET URLs.
pub struct S3ArtifactStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_ttl: Duration,
}

impl S3ArtifactStore {
    /// Create a store from ambient AWS configuration (env, profile, IMDS).
    ///
    /// * `bucket`  - target bucket name.
    /// * `url_ttl` - how long presigned URLs must stay valid; callers
    ///   should pass the cache TTL plus a safety margin.
    pub async fn from_env(bucket: String, url_ttl: Duration) -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket,
            url_ttl,
        }
    }

    /// Create a store around an existing SDK client (tests, custom
    /// endpoints).
    pub fn with_client(client: aws_sdk_s3::Client, bucket: String, url_ttl: Duration) -> Self {
        Self {
            client,
            bucket,
            url_ttl,
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<String, CloudError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("image/png")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| CloudError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let presign = PresigningConfig::expires_in(self.url_ttl).map_err(|e| {
            CloudError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign)
            .await
            .map_err(|e| CloudError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        tracing::info!(key, size, "Uploaded comic bitmap");
        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), CloudError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| CloudError::Delete {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(key, "Deleted comic bitmap");
        Ok(())
    }
}
