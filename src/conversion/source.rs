//! Where resume text comes from and where converted artifacts go
//!
//! Both sources use the same layout: `text/<key>.txt` holds the raw text and
//! `json/<key>.json` the last conversion of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::services::{AWSError, AWSService};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] AWSError),
}

#[async_trait]
pub trait TextSource: Send + Sync {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    /// Modification time of the text, `None` when it does not exist
    async fn text_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError>;

    /// Modification time of the artifact, `None` when it does not exist
    async fn artifact_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError>;

    async fn read_text(&self, key: &str) -> Result<String, SourceError>;

    async fn read_artifact(&self, key: &str) -> Result<String, SourceError>;

    async fn write_artifact(&self, key: &str, contents: &str) -> Result<(), SourceError>;
}

pub fn text_object_key(key: &str) -> String {
    format!("text/{}.txt", key)
}

pub fn artifact_object_key(key: &str) -> String {
    format!("json/{}.json", key)
}

/// Keys are relative names: ASCII letters, digits, `-`, `_`, `.` and `/`
/// separators, with no empty, `.` or `..` segments
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 200
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// Text and artifacts under a local directory
#[derive(Debug, Clone)]
pub struct LocalDirSource {
    root: PathBuf,
}

impl LocalDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn text_path(&self, key: &str) -> PathBuf {
        self.root.join(text_object_key(key))
    }

    fn artifact_path(&self, key: &str) -> PathBuf {
        self.root.join(artifact_object_key(key))
    }

    async fn modified(path: PathBuf) -> Result<Option<DateTime<Utc>>, SourceError> {
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(DateTime::<Utc>::from(meta.modified()?))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Source file does not exist");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl TextSource for LocalDirSource {
    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }

    async fn text_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError> {
        Self::modified(self.text_path(key)).await
    }

    async fn artifact_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError> {
        Self::modified(self.artifact_path(key)).await
    }

    async fn read_text(&self, key: &str) -> Result<String, SourceError> {
        Ok(tokio::fs::read_to_string(self.text_path(key)).await?)
    }

    async fn read_artifact(&self, key: &str) -> Result<String, SourceError> {
        Ok(tokio::fs::read_to_string(self.artifact_path(key)).await?)
    }

    async fn write_artifact(&self, key: &str, contents: &str) -> Result<(), SourceError> {
        let path = self.artifact_path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }
}

/// Text and artifacts in an S3 bucket
#[derive(Debug, Clone)]
pub struct S3Source {
    storage: AWSService,
}

impl S3Source {
    pub fn new(storage: AWSService) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TextSource for S3Source {
    fn describe(&self) -> String {
        format!("s3://{}", self.storage.bucket())
    }

    async fn text_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError> {
        let head = self.storage.head_object(&text_object_key(key)).await?;
        if let Some(object) = &head {
            debug!(key = %key, size = object.size, "Resume text found in S3");
        }
        Ok(head.map(|o| o.last_modified.unwrap_or(DateTime::<Utc>::MIN_UTC)))
    }

    async fn artifact_modified(&self, key: &str) -> Result<Option<DateTime<Utc>>, SourceError> {
        let head = self.storage.head_object(&artifact_object_key(key)).await?;
        Ok(head.map(|o| o.last_modified.unwrap_or(DateTime::<Utc>::MIN_UTC)))
    }

    async fn read_text(&self, key: &str) -> Result<String, SourceError> {
        Ok(self.storage.get_text(&text_object_key(key)).await?)
    }

    async fn read_artifact(&self, key: &str) -> Result<String, SourceError> {
        Ok(self.storage.get_text(&artifact_object_key(key)).await?)
    }

    async fn write_artifact(&self, key: &str, contents: &str) -> Result<(), SourceError> {
        self.storage
            .put_object(
                &artifact_object_key(key),
                contents.as_bytes().to_vec(),
                "application/json",
            )
            .await?;
        Ok(())
    }
}
