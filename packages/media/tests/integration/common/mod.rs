use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use ::common::storage::BlobStore;
use ::common::storage::filesystem::FilesystemBlobStore;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use media::config::MediaSettings;
use media::naming::THUMBS_DIR;
use media::{MemoryPictureRepository, PictureService, TextCache};
use tempfile::TempDir;

pub const BASE_URL: &str = "http://shop.test/content";

/// A picture service over a fresh temporary web root.
pub struct TestMedia {
    pub root: TempDir,
    pub store: Arc<dyn BlobStore>,
    pub pictures: Arc<MemoryPictureRepository>,
    pub service: PictureService,
}

impl TestMedia {
    pub async fn spawn() -> Self {
        Self::with_settings(MediaSettings::default()).await
    }

    pub async fn with_settings(settings: MediaSettings) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp web root");
        let mut store = FilesystemBlobStore::new(root.path().to_path_buf(), BASE_URL)
            .await
            .expect("Failed to open filesystem store");
        if settings.multiple_thumb_directories {
            store = store.with_sharded_namespace(THUMBS_DIR);
        }
        let store: Arc<dyn BlobStore> = Arc::new(store);
        let pictures = Arc::new(MemoryPictureRepository::new());
        let service = PictureService::new(store.clone(), pictures.clone(), settings);

        Self {
            root,
            store,
            pictures,
            service,
        }
    }

    pub fn cache(&self) -> TextCache {
        TextCache::new(self.store.clone())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Places a file directly in the web root, bypassing the service.
    pub fn seed(&self, relative: &str, data: &[u8]) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, data).unwrap();
    }

    /// Thumbnail file names currently on disk, shard directories included.
    pub fn thumb_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut dirs = vec![self.path(THUMBS_DIR)];
        while let Some(dir) = dirs.pop() {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                if entry.file_type().unwrap().is_dir() {
                    dirs.push(entry.path());
                } else {
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        names
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Gif)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([180, 90, 20]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("Failed to encode fixture image");
    buf
}

pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("Failed to decode image");
    (img.width(), img.height())
}
