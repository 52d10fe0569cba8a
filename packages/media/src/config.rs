use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{FilesystemConfig, S3Config, StorageBackendKind, StorageConfig};

/// Picture handling settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaSettings {
    /// Keep picture binaries on the picture record instead of the blob
    /// backend. Thumbnails always live on the blob backend. Default: false.
    #[serde(default)]
    pub store_in_db: bool,
    /// JPEG quality used when re-encoding thumbnails (0-100). Default: 80.
    /// 0 encodes at the JPEG encoder's lowest setting, 1. Values above 100
    /// are rejected on load.
    #[serde(default = "default_image_quality")]
    pub default_image_quality: u8,
    /// Uploads with a longer edge are shrunk on insert. Default: 1980.
    #[serde(default = "default_maximum_image_size")]
    pub maximum_image_size: u32,
    /// Shard local thumbnails into 3-character subdirectories. Default: false.
    #[serde(default)]
    pub multiple_thumb_directories: bool,
    /// Rewrite returned URLs onto `cdn_base_url`. Default: false.
    #[serde(default)]
    pub enable_cdn: bool,
    #[serde(default)]
    pub cdn_base_url: String,
    /// Default: "default-image.gif".
    #[serde(default = "default_image_name")]
    pub default_image_name: String,
    /// Default: "default-avatar.jpg".
    #[serde(default = "default_avatar_name")]
    pub default_avatar_name: String,
}

const MAX_IMAGE_QUALITY: u8 = 100;

fn default_image_quality() -> u8 {
    80
}
fn default_maximum_image_size() -> u32 {
    1980
}
fn default_image_name() -> String {
    "default-image.gif".into()
}
fn default_avatar_name() -> String {
    "default-avatar.jpg".into()
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            store_in_db: false,
            default_image_quality: default_image_quality(),
            maximum_image_size: default_maximum_image_size(),
            multiple_thumb_directories: false,
            enable_cdn: false,
            cdn_base_url: String::new(),
            default_image_name: default_image_name(),
            default_avatar_name: default_avatar_name(),
        }
    }
}

/// Media application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MediaAppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub media: MediaSettings,
}

impl MediaAppConfig {
    /// Load from `config/config.toml` (or `$STOREFRONT_CONFIG`) and
    /// `STOREFRONT__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| "config/config".to_string());
        Self::load_from(config_path)
    }

    pub fn load_from(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("storage.backend", "filesystem")?
            .set_default("storage.filesystem.web_root", "wwwroot")?
            .set_default("media.default_image_quality", 80_i64)?
            .set_default("media.maximum_image_size", 1980_i64)?
            .add_source(File::from(config_path.as_ref()).required(false))
            // Override from environment (e.g., STOREFRONT__STORAGE__S3__BUCKET)
            .add_source(Environment::with_prefix("STOREFRONT").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        if config.media.default_image_quality > MAX_IMAGE_QUALITY {
            return Err(ConfigError::Message(format!(
                "media.default_image_quality must be 0-{MAX_IMAGE_QUALITY}, got {}",
                config.media.default_image_quality
            )));
        }
        Ok(config)
    }
}
