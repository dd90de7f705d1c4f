// src/services/aws.rs
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::config::StorageConfig;

#[derive(Debug, Error)]
pub enum AWSError {
    #[error("AWS credentials not configured")]
    NotConfigured,

    #[error("S3 operation failed: {0}")]
    S3Error(String),

    #[error("Object is not valid UTF-8: {0}")]
    InvalidText(String),
}

/// Metadata of a single object
#[derive(Debug, Clone)]
pub struct S3Object {
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// S3 access for one bucket, built once at startup
#[derive(Debug, Clone)]
pub struct AWSService {
    client: S3Client,
    bucket: String,
}

impl AWSService {
    /// Build the client from static credentials
    pub async fn from_config(config: &StorageConfig) -> Result<Self, AWSError> {
        let (Some(access_key_id), Some(secret_access_key), Some(bucket)) = (
            config.access_key_id.as_ref(),
            config.secret_access_key.as_ref(),
            config.bucket_name.as_ref(),
        ) else {
            return Err(AWSError::NotConfigured);
        };

        let credentials = Credentials::new(access_key_id, secret_access_key, None, None, "environment");

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        info!(bucket = %bucket, region = %config.region, "S3 client configured");

        Ok(Self {
            client: S3Client::new(&aws_config),
            bucket: bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object metadata, or `None` when the key does not exist
    pub async fn head_object(&self, key: &str) -> Result<Option<S3Object>, AWSError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(S3Object {
                size: output.content_length().unwrap_or(0),
                last_modified: output.last_modified().map(|dt| {
                    DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()).unwrap_or_else(Utc::now)
                }),
            })),
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .map(|se| se.is_not_found())
                    .unwrap_or(false);
                if not_found {
                    debug!(key = %key, bucket = %self.bucket, "S3 object does not exist");
                    Ok(None)
                } else {
                    error!(error = %e, key = %key, "Failed to stat S3 object");
                    Err(AWSError::S3Error(format!("Head failed for '{}': {}", key, e)))
                }
            }
        }
    }

    /// Download an object as UTF-8 text
    pub async fn get_text(&self, key: &str) -> Result<String, AWSError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to download S3 object");
                AWSError::S3Error(format!("Download failed for '{}': {}", key, e))
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| AWSError::S3Error(format!("Read failed for '{}': {}", key, e)))?
            .into_bytes();

        String::from_utf8(data.to_vec()).map_err(|e| AWSError::InvalidText(e.to_string()))
    }

    /// Upload bytes under `key`
    pub async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AWSError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(data)))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload file to S3");
                AWSError::S3Error(format!("Upload failed: {}", e))
            })?;

        info!(key = %key, bucket = %self.bucket, "File uploaded to S3 successfully");
        Ok(())
    }
}
