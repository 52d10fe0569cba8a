use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{MediaError, Result};

/// Which default picture stands in for a missing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PictureType {
    #[default]
    Entity,
    Avatar,
}

/// A stored picture record.
///
/// `binary` is only authoritative when pictures are kept on the record;
/// otherwise it is empty and the bytes live on the blob backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Picture {
    pub id: i32,
    pub mime_type: String,
    pub seo_filename: Option<String>,
    pub binary: Vec<u8>,
    pub is_new: bool,
    pub alt_attribute: Option<String>,
    pub title_attribute: Option<String>,
}

impl Picture {
    pub fn seo_filename(&self) -> Option<&str> {
        self.seo_filename.as_deref().filter(|s| !s.is_empty())
    }
}

/// Input for [`crate::PictureService::insert_picture`].
#[derive(Debug, Clone, Default)]
pub struct NewPicture {
    pub binary: Vec<u8>,
    pub mime_type: String,
    pub seo_filename: Option<String>,
    pub alt_attribute: Option<String>,
    pub title_attribute: Option<String>,
    pub is_new: bool,
    /// Shrink over-sized uploads before storing them.
    pub validate_binary: bool,
}

impl NewPicture {
    pub fn new(binary: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            binary,
            mime_type: mime_type.into(),
            is_new: true,
            validate_binary: true,
            ..Self::default()
        }
    }

    pub fn seo_filename(mut self, seo_filename: impl Into<String>) -> Self {
        self.seo_filename = Some(seo_filename.into());
        self
    }
}

/// Persistence for picture records.
#[async_trait]
pub trait PictureRepository: Send + Sync {
    async fn get(&self, id: i32) -> Result<Option<Picture>>;

    /// Insert a record, assigning and returning its id.
    async fn insert(&self, picture: Picture) -> Result<Picture>;

    async fn update(&self, picture: &Picture) -> Result<()>;

    async fn delete(&self, id: i32) -> Result<()>;
}

/// In-process repository for tests and tools.
#[derive(Debug, Default)]
pub struct MemoryPictureRepository {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i32,
    pictures: BTreeMap<i32, Picture>,
}

impl MemoryPictureRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.pictures.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PictureRepository for MemoryPictureRepository {
    async fn get(&self, id: i32) -> Result<Option<Picture>> {
        Ok(self.inner.lock().await.pictures.get(&id).cloned())
    }

    async fn insert(&self, mut picture: Picture) -> Result<Picture> {
        let mut state = self.inner.lock().await;
        state.next_id += 1;
        picture.id = state.next_id;
        state.pictures.insert(picture.id, picture.clone());
        Ok(picture)
    }

    async fn update(&self, picture: &Picture) -> Result<()> {
        let mut state = self.inner.lock().await;
        match state.pictures.get_mut(&picture.id) {
            Some(existing) => {
                *existing = picture.clone();
                Ok(())
            }
            None => Err(MediaError::PictureNotFound(picture.id)),
        }
    }

    async fn delete(&self, id: i32) -> Result<()> {
        self.inner.lock().await.pictures.remove(&id);
        Ok(())
    }
}
