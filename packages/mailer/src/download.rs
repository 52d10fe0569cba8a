use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::MailError;

/// A downloadable file that can be attached to outgoing mail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Download {
    pub id: i32,
    /// The file lives at an external URL and has no binary to attach.
    pub use_download_url: bool,
    pub download_url: Option<String>,
    pub filename: String,
    /// Extension including the leading dot, e.g. ".pdf".
    pub extension: String,
    pub content_type: String,
    pub binary: Vec<u8>,
}

impl Download {
    /// Attachment name: the file name (or the id when blank) plus extension.
    pub fn attachment_name(&self) -> String {
        let stem = if self.filename.trim().is_empty() {
            self.id.to_string()
        } else {
            self.filename.clone()
        };
        format!("{stem}{}", self.extension)
    }
}

#[async_trait]
pub trait DownloadRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Download>, MailError>;
}

#[derive(Debug, Default)]
pub struct MemoryDownloadRepository {
    downloads: RwLock<HashMap<i32, Download>>,
}

impl MemoryDownloadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, download: Download) {
        self.downloads.write().await.insert(download.id, download);
    }
}

#[async_trait]
impl DownloadRepository for MemoryDownloadRepository {
    async fn get(&self, id: i32) -> Result<Option<Download>, MailError> {
        Ok(self.downloads.read().await.get(&id).cloned())
    }
}
