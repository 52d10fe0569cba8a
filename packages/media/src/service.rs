use std::sync::Arc;

use common::storage::{BlobStore, PutOptions, StorageError, open_blob_store};
use tracing::{debug, error, info, warn};

use crate::cdn;
use crate::config::{MediaAppConfig, MediaSettings};
use crate::error::{MediaError, Result};
use crate::naming::{
    THUMBS_DIR, default_thumb_file_name, image_key, mime_from_file_name, stored_file_name,
    thumb_file_name, thumb_key, thumbs_prefix,
};
use crate::picture::{NewPicture, Picture, PictureRepository, PictureType};
use crate::resize::Resizer;

const MAX_MIME_TYPE_LEN: usize = 20;
const MAX_SEO_FILENAME_LEN: usize = 100;

/// How a picture URL is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlOptions {
    /// Long-edge size in pixels; 0 serves the picture at full size.
    pub target_size: u32,
    /// Fall back to the default picture when the picture has no binary.
    pub show_default: bool,
    pub picture_type: PictureType,
}

impl UrlOptions {
    pub fn sized(target_size: u32) -> Self {
        Self {
            target_size,
            ..Self::default()
        }
    }

    pub fn without_default(mut self) -> Self {
        self.show_default = false;
        self
    }

    pub fn avatar(mut self) -> Self {
        self.picture_type = PictureType::Avatar;
        self
    }
}

impl Default for UrlOptions {
    fn default() -> Self {
        Self {
            target_size: 0,
            show_default: true,
            picture_type: PictureType::Entity,
        }
    }
}

/// Stores pictures and serves thumbnail URLs over a [`BlobStore`].
///
/// Thumbnails are generated lazily: the first URL request for a size
/// resizes the source and stores the result, later requests only check
/// that the thumbnail exists.
pub struct PictureService {
    store: Arc<dyn BlobStore>,
    pictures: Arc<dyn PictureRepository>,
    resizer: Resizer,
    settings: MediaSettings,
}

impl PictureService {
    pub fn new(
        store: Arc<dyn BlobStore>,
        pictures: Arc<dyn PictureRepository>,
        settings: MediaSettings,
    ) -> Self {
        Self {
            store,
            pictures,
            resizer: Resizer::new(settings.default_image_quality),
            settings,
        }
    }

    /// Open the configured backend and build a service over it.
    pub async fn from_config(
        config: &MediaAppConfig,
        pictures: Arc<dyn PictureRepository>,
    ) -> Result<Self> {
        let sharded: &[&str] = if config.media.multiple_thumb_directories {
            &[THUMBS_DIR]
        } else {
            &[]
        };
        let store = open_blob_store(&config.storage, sharded).await?;
        Ok(Self::new(store, pictures, config.media.clone()))
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    pub async fn get_picture(&self, picture_id: i32) -> Result<Option<Picture>> {
        self.pictures.get(picture_id).await
    }

    /// Insert a picture and write its binary to the authoritative location.
    pub async fn insert_picture(&self, new: NewPicture) -> Result<Picture> {
        let mime_type = truncate_chars(&new.mime_type, MAX_MIME_TYPE_LEN);
        let seo_filename = new
            .seo_filename
            .as_deref()
            .map(|s| truncate_chars(s, MAX_SEO_FILENAME_LEN));
        let binary = if new.validate_binary {
            self.validate(new.binary).await?
        } else {
            new.binary
        };

        let picture = self
            .pictures
            .insert(Picture {
                id: 0,
                binary: if self.settings.store_in_db {
                    binary.clone()
                } else {
                    Vec::new()
                },
                mime_type,
                seo_filename,
                is_new: new.is_new,
                alt_attribute: new.alt_attribute,
                title_attribute: new.title_attribute,
            })
            .await?;

        if !self.settings.store_in_db {
            self.save_original(picture.id, &binary, &picture.mime_type).await?;
        }

        info!(picture_id = picture.id, mime_type = %picture.mime_type, "Inserted picture");
        Ok(picture)
    }

    /// Replace a picture's binary and metadata. Existing thumbnails are swept.
    pub async fn update_picture(&self, picture_id: i32, update: NewPicture) -> Result<Picture> {
        let mut picture = self
            .pictures
            .get(picture_id)
            .await?
            .ok_or(MediaError::PictureNotFound(picture_id))?;

        let binary = if update.validate_binary {
            self.validate(update.binary).await?
        } else {
            update.binary
        };

        self.delete_thumbs(picture_id).await;

        let mime_type = truncate_chars(&update.mime_type, MAX_MIME_TYPE_LEN);
        let old_original = stored_file_name(picture_id, &picture.mime_type);
        let new_original = stored_file_name(picture_id, &mime_type);
        if !self.settings.store_in_db && old_original != new_original {
            self.delete_best_effort(&image_key(&old_original), picture_id)
                .await;
        }

        picture.mime_type = mime_type;
        picture.seo_filename = update
            .seo_filename
            .as_deref()
            .map(|s| truncate_chars(s, MAX_SEO_FILENAME_LEN));
        picture.alt_attribute = update.alt_attribute;
        picture.title_attribute = update.title_attribute;
        picture.is_new = update.is_new;
        picture.binary = if self.settings.store_in_db {
            binary.clone()
        } else {
            Vec::new()
        };
        self.pictures.update(&picture).await?;

        if !self.settings.store_in_db {
            self.save_original(picture_id, &binary, &picture.mime_type).await?;
        }

        info!(picture_id, "Updated picture");
        Ok(picture)
    }

    /// Change the SEO name. Thumbnails are swept only when it actually changes.
    pub async fn set_seo_filename(&self, picture_id: i32, seo_filename: &str) -> Result<Picture> {
        let mut picture = self
            .pictures
            .get(picture_id)
            .await?
            .ok_or(MediaError::PictureNotFound(picture_id))?;

        let seo_filename = truncate_chars(seo_filename, MAX_SEO_FILENAME_LEN);
        if picture.seo_filename.as_deref() == Some(seo_filename.as_str()) {
            return Ok(picture);
        }

        self.delete_thumbs(picture_id).await;
        picture.seo_filename = Some(seo_filename);
        self.pictures.update(&picture).await?;
        Ok(picture)
    }

    /// Remove thumbnails, the stored original and the record.
    ///
    /// Blob removal is best effort: failures are logged and the remaining
    /// keys are still attempted. Only the record deletion is fatal.
    pub async fn delete_picture(&self, picture: &Picture) -> Result<()> {
        self.delete_thumbs(picture.id).await;

        if !self.settings.store_in_db {
            let key = image_key(&stored_file_name(picture.id, &picture.mime_type));
            self.delete_best_effort(&key, picture.id).await;
        }

        self.pictures.delete(picture.id).await?;
        info!(picture_id = picture.id, "Deleted picture");
        Ok(())
    }

    /// Bytes of a picture from its authoritative location. Missing blobs
    /// yield an empty vector.
    pub async fn load_picture_binary(&self, picture: &Picture) -> Result<Vec<u8>> {
        if self.settings.store_in_db {
            return Ok(picture.binary.clone());
        }
        let key = image_key(&stored_file_name(picture.id, &picture.mime_type));
        match self.store.get(&key).await {
            Ok(data) => Ok(data),
            Err(StorageError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    // ------------------------------------------------------------------
    // URLs
    // ------------------------------------------------------------------

    /// URL of `picture` at the requested size, generating the thumbnail
    /// on first use. `Ok(None)` means there is no image to show.
    pub async fn try_picture_url(
        &self,
        picture: Option<&Picture>,
        options: UrlOptions,
    ) -> Result<Option<String>> {
        let Some(picture) = picture else {
            return self.fallback(options).await;
        };

        let file_name = thumb_file_name(
            picture.id,
            picture.seo_filename(),
            options.target_size,
            &picture.mime_type,
        );
        let key = thumb_key(&file_name);
        if self.store.exists(&key).await? {
            debug!(picture_id = picture.id, key = %key, "Thumbnail already present");
            return Ok(Some(self.public_url(&key)));
        }

        let binary = self.load_picture_binary(picture).await?;
        if binary.is_empty() {
            return self.fallback(options).await;
        }

        let data = self.resize(binary, options.target_size).await?;
        self.store
            .put(&key, &data, &PutOptions::with_content_type(&picture.mime_type))
            .await?;
        debug!(picture_id = picture.id, key = %key, bytes = data.len(), "Generated thumbnail");
        Ok(Some(self.public_url(&key)))
    }

    /// Like [`Self::try_picture_url`], but failures are logged and yield "".
    pub async fn picture_url(&self, picture: Option<&Picture>, options: UrlOptions) -> String {
        match self.try_picture_url(picture, options).await {
            Ok(url) => url.unwrap_or_default(),
            Err(e) => {
                log_failure(picture.map(|p| p.id), &e);
                String::new()
            }
        }
    }

    pub async fn try_picture_url_by_id(
        &self,
        picture_id: i32,
        options: UrlOptions,
    ) -> Result<Option<String>> {
        let picture = self.pictures.get(picture_id).await?;
        self.try_picture_url(picture.as_ref(), options).await
    }

    pub async fn picture_url_by_id(&self, picture_id: i32, options: UrlOptions) -> String {
        match self.try_picture_url_by_id(picture_id, options).await {
            Ok(url) => url.unwrap_or_default(),
            Err(e) => {
                log_failure(Some(picture_id), &e);
                String::new()
            }
        }
    }

    /// URL of the configured default picture. `Ok(None)` when the default
    /// file itself is missing from the backend.
    pub async fn try_default_picture_url(
        &self,
        target_size: u32,
        picture_type: PictureType,
    ) -> Result<Option<String>> {
        let name = match picture_type {
            PictureType::Entity => &self.settings.default_image_name,
            PictureType::Avatar => &self.settings.default_avatar_name,
        };
        let source_key = image_key(name);
        if !self.store.exists(&source_key).await? {
            warn!(key = %source_key, "Default picture is missing");
            return Ok(None);
        }
        if target_size == 0 {
            return Ok(Some(self.public_url(&source_key)));
        }

        let key = thumb_key(&default_thumb_file_name(name, target_size));
        if !self.store.exists(&key).await? {
            let source = self.store.get(&source_key).await?;
            let data = self.resize(source, target_size).await?;
            let options = PutOptions {
                content_type: mime_from_file_name(name).map(str::to_string),
                expires_in: None,
            };
            self.store.put(&key, &data, &options).await?;
        }
        Ok(Some(self.public_url(&key)))
    }

    pub async fn default_picture_url(&self, target_size: u32, picture_type: PictureType) -> String {
        match self.try_default_picture_url(target_size, picture_type).await {
            Ok(url) => url.unwrap_or_default(),
            Err(e) => {
                log_failure(None, &e);
                String::new()
            }
        }
    }

    /// Public URL of a key, rewritten onto the CDN when enabled.
    pub fn public_url(&self, key: &str) -> String {
        let url = self.store.url(key);
        if self.settings.enable_cdn && !self.settings.cdn_base_url.is_empty() {
            cdn::rewrite_url(&url, self.store.base_url(), &self.settings.cdn_base_url)
        } else {
            url
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    async fn fallback(&self, options: UrlOptions) -> Result<Option<String>> {
        if options.show_default {
            self.try_default_picture_url(options.target_size, options.picture_type)
                .await
        } else {
            Ok(None)
        }
    }

    async fn save_original(&self, picture_id: i32, data: &[u8], mime_type: &str) -> Result<()> {
        let key = image_key(&stored_file_name(picture_id, mime_type));
        self.store
            .put(&key, data, &PutOptions::with_content_type(mime_type))
            .await?;
        Ok(())
    }

    async fn resize(&self, data: Vec<u8>, target_size: u32) -> Result<Vec<u8>> {
        if target_size == 0 {
            return Ok(data);
        }
        let resizer = self.resizer;
        Ok(tokio::task::spawn_blocking(move || resizer.resize(&data, target_size)).await??)
    }

    async fn validate(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let resizer = self.resizer;
        let maximum = self.settings.maximum_image_size;
        Ok(tokio::task::spawn_blocking(move || resizer.validate(&data, maximum)).await??)
    }

    /// Deletes every thumbnail of a picture. Returns how many were removed.
    async fn delete_thumbs(&self, picture_id: i32) -> usize {
        let prefix = thumbs_prefix(picture_id);
        let keys = match self.store.list(&prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                log_failure(Some(picture_id), &MediaError::from(e));
                return 0;
            }
        };

        let mut deleted = 0;
        for key in keys.iter().filter(|key| is_thumb_of(key, &prefix)) {
            if self.delete_best_effort(key, picture_id).await {
                deleted += 1;
            }
        }
        if deleted > 0 {
            info!(picture_id, deleted, "Swept picture thumbnails");
        }
        deleted
    }

    async fn delete_best_effort(&self, key: &str, picture_id: i32) -> bool {
        match self.store.delete(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(picture_id, key, error = %e, "Failed to delete picture blob");
                false
            }
        }
    }
}

/// `prefix` is the padded id; the next character must end the id so that
/// `0000042` does not claim `00000420_...`.
fn is_thumb_of(key: &str, prefix: &str) -> bool {
    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('_') || rest.starts_with('.'))
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

fn log_failure(picture_id: Option<i32>, err: &MediaError) {
    if err.is_credential_error() {
        error!(?picture_id, error = %err, "Object store rejected credentials; check access key configuration");
        return;
    }
    match err {
        MediaError::Image(e) => warn!(?picture_id, error = %e, "Could not generate picture thumbnail"),
        other => error!(?picture_id, error = %other, "Picture storage failure"),
    }
}
