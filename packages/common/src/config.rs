use std::path::PathBuf;

use serde::Deserialize;

/// Which blob backend holds pictures, thumbnails and cache files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Filesystem,
    S3,
}

/// Local web-root storage.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemConfig {
    /// Directory served as static content. Default: "wwwroot".
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,
    /// Public URL of `web_root`. Default: "http://localhost/content".
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_web_root() -> PathBuf {
    PathBuf::from("wwwroot")
}
fn default_base_url() -> String {
    "http://localhost/content".into()
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            web_root: default_web_root(),
            base_url: default_base_url(),
        }
    }
}

/// S3-compatible object store.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    /// Bucket name. Required when the S3 backend is selected.
    #[serde(default)]
    pub bucket: String,
    /// Public root URL; object URLs are `{root_url}/{bucket}/{key}`.
    /// Default: "https://s3.amazonaws.com".
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// Region name. Default: "ap-southeast-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, R2, ...).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// Days from upload until an object's `Expires` header. Default: 30.
    #[serde(default = "default_expires_days")]
    pub expires_days: u32,
}

fn default_root_url() -> String {
    "https://s3.amazonaws.com".into()
}
fn default_region() -> String {
    "ap-southeast-1".into()
}
fn default_expires_days() -> u32 {
    30
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            root_url: default_root_url(),
            region: default_region(),
            endpoint: None,
            force_path_style: false,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            expires_days: default_expires_days(),
        }
    }
}

impl S3Config {
    /// Public URL prefix of every object in the bucket.
    pub fn bucket_url(&self) -> String {
        format!("{}/{}", self.root_url.trim_end_matches('/'), self.bucket)
    }
}

/// App-level storage configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    #[serde(default)]
    pub s3: S3Config,
}
