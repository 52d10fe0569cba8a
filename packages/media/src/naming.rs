//! Deterministic blob keys for pictures and thumbnails.

/// Namespace of stored originals and default pictures.
pub const IMAGES_DIR: &str = "images";
/// Namespace of generated thumbnails.
pub const THUMBS_DIR: &str = "images/thumbs";

/// File extension for a MIME type: the last path segment, with the legacy
/// browser aliases mapped to their common extension.
pub fn extension_from_mime(mime_type: &str) -> &str {
    let last = mime_type.rsplit('/').next().unwrap_or(mime_type);
    match last {
        "pjpeg" => "jpg",
        "x-png" => "png",
        "x-icon" => "ico",
        other => other,
    }
}

/// Picture id zero-padded to 7 digits.
pub fn padded_id(picture_id: i32) -> String {
    format!("{picture_id:07}")
}

/// File name of the stored original binary.
pub fn stored_file_name(picture_id: i32, mime_type: &str) -> String {
    format!("{}_0.{}", padded_id(picture_id), extension_from_mime(mime_type))
}

/// File name served for a picture at `target_size`. Size 0 names the
/// full-size copy.
pub fn thumb_file_name(
    picture_id: i32,
    seo_filename: Option<&str>,
    target_size: u32,
    mime_type: &str,
) -> String {
    let id = padded_id(picture_id);
    let ext = extension_from_mime(mime_type);
    let seo = seo_filename.filter(|s| !s.is_empty());

    match (seo, target_size) {
        (Some(seo), 0) => format!("{id}_{seo}.{ext}"),
        (None, 0) => format!("{id}.{ext}"),
        (Some(seo), size) => format!("{id}_{seo}_{size}.{ext}"),
        (None, size) => format!("{id}_{size}.{ext}"),
    }
}

/// Thumbnail file name of a default picture: `{stem}_{size}{.ext}`.
pub fn default_thumb_file_name(default_name: &str, target_size: u32) -> String {
    match default_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{target_size}.{ext}"),
        _ => format!("{default_name}_{target_size}"),
    }
}

/// MIME type implied by a file name's extension, if recognised.
pub fn mime_from_file_name(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    image::ImageFormat::from_extension(ext).map(|f| f.to_mime_type())
}

pub fn image_key(file_name: &str) -> String {
    format!("{IMAGES_DIR}/{file_name}")
}

pub fn thumb_key(file_name: &str) -> String {
    format!("{THUMBS_DIR}/{file_name}")
}

/// Prefix shared by every thumbnail of a picture.
pub fn thumbs_prefix(picture_id: i32) -> String {
    thumb_key(&padded_id(picture_id))
}
