//! Text blobs cached under `caches/` on the picture backend.
//!
//! There is no in-process layer and no eviction: entries are overwritten or
//! removed on demand. Only object-store backends record an expiry.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::storage::{BlobStore, PutOptions, StorageError};
use tracing::{debug, info};

use crate::error::Result;

const CACHE_DIR: &str = "caches";
const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Well-known cache entry names.
pub mod names {
    pub const MEGA_MENU: &str = "megamenu";
    pub const PARTNER_TOP: &str = "partnertop";
    pub const QUICK_GO_LINK: &str = "quickgolink";
    pub const HOME_PAGE_SPECIAL_CATEGORY: &str = "homepage_specialcategory";
    pub const SPECIAL_CATEGORY_OLD: &str = "special_category_old";
    pub const HOME_PAGE_SLIDER_BOTTOM: &str = "homepage_sliderbottom";
    pub const HOME_PAGE_LEFT_NAVIGATION: &str = "homepage_leftnav";
    pub const SLIDE_SHOW_DESKTOP: &str = "homepage_slideshow_desktop";
    pub const SLIDE_SHOW_MOBILE: &str = "homepage_slideshow_mobile";
    pub const HOME_PAGE_RECOMMENDED_BLOCK: &str = "homepage_onload_recommended";

    /// Array path of per-category navigation entries.
    pub const CATEGORY_NAV: &str = "category_nav";
}

pub struct TextCache {
    store: Arc<dyn BlobStore>,
}

impl TextCache {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Store `content` under `name`, replacing any previous entry.
    /// `expire_in` of `None` uses the backend's default lifetime.
    pub async fn write_cache(
        &self,
        content: &str,
        name: &str,
        expire_in: Option<Duration>,
    ) -> Result<()> {
        self.write(&cache_key(name), content, expire_in).await
    }

    /// Cached text, or an empty string when there is no entry.
    pub async fn get_cache(&self, name: &str) -> Result<String> {
        Ok(self.read(&cache_key(name), false).await?.unwrap_or_default())
    }

    pub async fn remove_cache(&self, name: &str) -> Result<()> {
        self.store.delete(&cache_key(name)).await?;
        Ok(())
    }

    /// Entry `{array_path}/{identifier}`. With `delete_if_expired`, an entry
    /// whose backend expiry has passed is removed and reported as a miss.
    pub async fn try_get_cache_array(
        &self,
        identifier: i32,
        array_path: &str,
        delete_if_expired: bool,
    ) -> Result<Option<String>> {
        self.read(&array_key(identifier, array_path), delete_if_expired)
            .await
    }

    pub async fn try_write_cache_array(
        &self,
        identifier: i32,
        array_path: &str,
        content: &str,
        expire_in: Option<Duration>,
    ) -> Result<()> {
        self.write(&array_key(identifier, array_path), content, expire_in)
            .await
    }

    /// Returns whether an entry was present.
    pub async fn try_remove_cache_array(&self, identifier: i32, array_path: &str) -> Result<bool> {
        let key = array_key(identifier, array_path);
        if !self.store.exists(&key).await? {
            return Ok(false);
        }
        self.store.delete(&key).await?;
        Ok(true)
    }

    async fn write(&self, key: &str, content: &str, expire_in: Option<Duration>) -> Result<()> {
        let options = PutOptions::with_content_type(CONTENT_TYPE).expires_in(expire_in);
        self.store.put(key, content.as_bytes(), &options).await?;
        debug!(key, bytes = content.len(), "Wrote cache entry");
        Ok(())
    }

    async fn read(&self, key: &str, delete_if_expired: bool) -> Result<Option<String>> {
        if delete_if_expired {
            match self.store.expires_at(key).await {
                Ok(Some(expires)) if expires <= Utc::now() => {
                    self.store.delete(key).await?;
                    info!(key, %expires, "Removed expired cache entry");
                    return Ok(None);
                }
                Ok(_) => {}
                Err(StorageError::NotFound(_)) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }

        match self.store.get(key).await {
            Ok(data) => {
                debug!(key, "Cache hit");
                Ok(Some(String::from_utf8_lossy(&data).into_owned()))
            }
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn cache_key(name: &str) -> String {
    format!("{CACHE_DIR}/{name}.txt")
}

fn array_key(identifier: i32, array_path: &str) -> String {
    match array_path.trim_matches('/') {
        "" => cache_key(&identifier.to_string()),
        path => cache_key(&format!("{path}/{identifier}")),
    }
}
