use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),

    #[error("failed to encode {format:?} image: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
}

/// Which edge the target size applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeType {
    #[default]
    LongestSide,
    Width,
    Height,
}

/// Scales `(width, height)` so the chosen edge equals `target`, keeping the
/// aspect ratio. Both results are at least 1.
pub fn calculate_dimensions(
    (width, height): (u32, u32),
    target: u32,
    resize_type: ResizeType,
) -> (u32, u32) {
    let scale_by_width = |w: u32, h: u32| (target, (h as f32 * (target as f32 / w as f32)) as u32);
    let scale_by_height = |w: u32, h: u32| ((w as f32 * (target as f32 / h as f32)) as u32, target);

    let (w, h) = match resize_type {
        ResizeType::LongestSide if height > width => scale_by_height(width, height),
        ResizeType::LongestSide | ResizeType::Width => scale_by_width(width, height),
        ResizeType::Height => scale_by_height(width, height),
    };
    (w.max(1), h.max(1))
}

/// Decodes, scales and re-encodes pictures in their source format.
#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    quality: u8,
}

impl Resizer {
    /// `quality` applies to JPEG output and is clamped to 1-100, so a
    /// configured 0 encodes at the lowest quality.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Scale so the longer edge equals `target_size`. A target of 0 returns
    /// the input untouched.
    pub fn resize(&self, data: &[u8], target_size: u32) -> Result<Vec<u8>, ResizeError> {
        if target_size == 0 {
            return Ok(data.to_vec());
        }
        let (format, image) = decode(data)?;
        let (w, h) = calculate_dimensions(
            (image.width(), image.height()),
            target_size,
            ResizeType::LongestSide,
        );
        let resized = image.resize_exact(w, h, FilterType::Lanczos3);
        self.encode(&resized, format)
    }

    /// Shrink uploads whose longer edge exceeds `maximum_size`. Smaller
    /// pictures are returned as-is.
    pub fn validate(&self, data: &[u8], maximum_size: u32) -> Result<Vec<u8>, ResizeError> {
        let (format, image) = decode(data)?;
        if maximum_size == 0 || image.width().max(image.height()) <= maximum_size {
            return Ok(data.to_vec());
        }
        let (w, h) = calculate_dimensions(
            (image.width(), image.height()),
            maximum_size,
            ResizeType::LongestSide,
        );
        self.encode(&image.resize_exact(w, h, FilterType::Lanczos3), format)
    }

    fn encode(&self, image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ResizeError> {
        let mut buf = Vec::new();
        let result = match format {
            // Alpha is dropped by the encoder's colour conversion.
            ImageFormat::Jpeg => {
                image.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.quality))
            }
            _ => image.write_to(&mut Cursor::new(&mut buf), format),
        };
        result.map_err(|source| ResizeError::Encode { format, source })?;
        Ok(buf)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(80)
    }
}

fn decode(data: &[u8]) -> Result<(ImageFormat, DynamicImage), ResizeError> {
    let format = image::guess_format(data).map_err(ResizeError::Decode)?;
    let image = image::load_from_memory_with_format(data, format).map_err(ResizeError::Decode)?;
    Ok((format, image))
}
