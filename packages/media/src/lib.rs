//! Picture storage, thumbnail generation and text caching over a
//! filesystem or S3 blob backend.

pub mod cache;
pub mod cdn;
pub mod config;
pub mod error;
pub mod naming;
pub mod picture;
pub mod resize;
pub mod service;

pub use cache::TextCache;
pub use error::{MediaError, Result};
pub use picture::{MemoryPictureRepository, NewPicture, Picture, PictureRepository, PictureType};
pub use resize::{ResizeError, ResizeType, Resizer};
pub use service::{PictureService, UrlOptions};
