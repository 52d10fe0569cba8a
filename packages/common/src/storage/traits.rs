use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StorageError;

/// Per-write options for [`BlobStore::put`].
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// MIME type recorded with the blob where the backend supports it.
    pub content_type: Option<String>,
    /// How long the blob stays fresh. Backends without an expiry concept ignore it.
    pub expires_in: Option<Duration>,
}

impl PutOptions {
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            expires_in: None,
        }
    }

    pub fn expires_in(mut self, expires_in: Option<Duration>) -> Self {
        self.expires_in = expires_in;
        self
    }
}

/// Key-addressed blob storage.
///
/// Keys are relative `/`-separated paths such as `images/thumbs/0000042_300.png`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Retrieve all bytes for a blob.
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Store bytes under `key`, replacing any previous blob.
    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StorageError>;

    /// Delete a blob. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List the keys that start with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Expiry recorded for a blob, if the backend tracks one.
    async fn expires_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let _ = key;
        Ok(None)
    }

    /// Public URL root that every blob URL starts with.
    fn base_url(&self) -> &str;

    /// Public URL of a blob.
    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url().trim_end_matches('/'), key)
    }
}

/// Validates a relative blob key.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = |msg: &str| Err(StorageError::InvalidKey(format!("{msg}: {key:?}")));

    if key.is_empty() {
        return invalid("key cannot be empty");
    }
    if key.contains('\0') {
        return invalid("key must not contain null bytes");
    }
    if key.contains('\\') {
        return invalid("key must not contain backslashes");
    }
    if key.starts_with('/') {
        return invalid("key must not start with '/'");
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return invalid("key must not contain empty segments");
        }
        if segment == "." || segment == ".." {
            return invalid("key must not contain relative segments");
        }
    }
    Ok(())
}
