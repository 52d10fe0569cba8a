mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

use std::sync::Arc;

pub use error::StorageError;
pub use traits::{BlobStore, PutOptions, validate_key};

use crate::config::{StorageBackendKind, StorageConfig};

/// Open the configured blob backend.
///
/// `sharded_namespaces` only affects the filesystem backend; object store
/// keys stay flat.
pub async fn open_blob_store(
    config: &StorageConfig,
    sharded_namespaces: &[&str],
) -> Result<Arc<dyn BlobStore>, StorageError> {
    match config.backend {
        StorageBackendKind::Filesystem => {
            let mut store = filesystem::FilesystemBlobStore::new(
                config.filesystem.web_root.clone(),
                config.filesystem.base_url.clone(),
            )
            .await?;
            for namespace in sharded_namespaces {
                store = store.with_sharded_namespace(*namespace);
            }
            Ok(Arc::new(store))
        }
        #[cfg(feature = "object-storage")]
        StorageBackendKind::S3 => {
            if config.s3.bucket.is_empty() {
                return Err(StorageError::Backend {
                    code: None,
                    message: "S3 backend selected but no bucket configured".into(),
                });
            }
            Ok(Arc::new(s3::S3BlobStore::new(&config.s3)))
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackendKind::S3 => Err(StorageError::Backend {
            code: None,
            message: "S3 backend requires the `object-storage` feature".into(),
        }),
    }
}
