use common::storage::StorageError;
use thiserror::Error;

use crate::resize::ResizeError;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image error: {0}")]
    Image(#[from] ResizeError),

    #[error("Picture not found: {0}")]
    PictureNotFound(i32),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Whether the object store rejected the configured credentials.
    pub fn is_credential_error(&self) -> bool {
        matches!(self, MediaError::Storage(e) if e.is_credential_error())
    }
}

impl From<tokio::task::JoinError> for MediaError {
    fn from(e: tokio::task::JoinError) -> Self {
        MediaError::Internal(format!("image task failed: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
