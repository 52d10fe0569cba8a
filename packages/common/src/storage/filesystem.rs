use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::traits::{BlobStore, PutOptions, validate_key};

/// Length of the file-stem prefix used as shard directory name.
const SHARD_PREFIX_LEN: usize = 3;

/// Blob store rooted at a directory served by the web front end.
///
/// A key maps to `{base_path}/{key}`. Namespaces registered with
/// [`FilesystemBlobStore::with_sharded_namespace`] put each file into a
/// subdirectory named after the first three characters of its stem:
/// `images/thumbs/0000042_300.png` lives at `images/thumbs/000/0000042_300.png`.
/// Keys stay unsharded; only the physical layout and public URLs change.
pub struct FilesystemBlobStore {
    base_path: PathBuf,
    base_url: String,
    sharded_namespaces: Vec<String>,
}

impl FilesystemBlobStore {
    /// Create a new filesystem blob store.
    pub async fn new(
        base_path: PathBuf,
        base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            base_url: base_url.into(),
            sharded_namespaces: Vec::new(),
        })
    }

    /// Shard files stored directly under `namespace` by stem prefix.
    pub fn with_sharded_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into().trim_end_matches('/').to_string();
        self.sharded_namespaces.push(namespace);
        self
    }

    fn is_sharded(&self, dir: &str) -> bool {
        self.sharded_namespaces.iter().any(|ns| ns == dir)
    }

    /// Key path relative to `base_path`, including the shard directory if any.
    fn physical_key(&self, key: &str) -> String {
        let (dir, name) = split_key(key);
        if self.is_sharded(dir) {
            if let Some(shard) = shard_dir(name) {
                return format!("{dir}/{shard}/{name}");
            }
        }
        key.to_string()
    }

    /// Compute the filesystem path for a given key.
    fn blob_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(self.physical_key(key)))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Scans one directory, collecting matching file keys and the subdirectories found.
    async fn scan_dir(
        path: &Path,
        dir: &str,
        name_prefix: &str,
        keys: &mut Vec<String>,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let mut entries = match fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut subdirs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().await?.is_dir() {
                subdirs.push(entry.path());
            } else if name.starts_with(name_prefix) {
                keys.push(join_key(dir, &name));
            }
        }
        Ok(subdirs)
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let blob_path = self.blob_path(key)?;
        Ok(fs::try_exists(&blob_path).await?)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let blob_path = self.blob_path(key)?;
        match fs::read(&blob_path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, data: &[u8], _options: &PutOptions) -> Result<(), StorageError> {
        let blob_path = self.blob_path(key)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &blob_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let blob_path = self.blob_path(key)?;
        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let (dir, name_prefix) = split_key(prefix);
        let dir_path = if dir.is_empty() {
            self.base_path.clone()
        } else {
            validate_key(dir)?;
            self.base_path.join(dir)
        };

        let mut keys = Vec::new();
        let subdirs = Self::scan_dir(&dir_path, dir, name_prefix, &mut keys).await?;
        if self.is_sharded(dir) {
            for shard in subdirs {
                Self::scan_dir(&shard, dir, name_prefix, &mut keys).await?;
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.physical_key(key)
        )
    }
}

/// Splits a key into its directory and file name.
fn split_key(key: &str) -> (&str, &str) {
    match key.rfind('/') {
        Some(pos) => (&key[..pos], &key[pos + 1..]),
        None => ("", key),
    }
}

fn join_key(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Shard directory for a file name: the first characters of its stem,
/// when the stem is longer than the shard prefix.
fn shard_dir(file_name: &str) -> Option<&str> {
    let stem = file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name);
    if stem.chars().count() <= SHARD_PREFIX_LEN {
        return None;
    }
    let end = stem
        .char_indices()
        .nth(SHARD_PREFIX_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(stem.len());
    Some(&stem[..end])
}
