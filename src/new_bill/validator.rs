//! Receipt file validation
//!
//! A receipt is accepted when its declared media type is one of
//! `image/jpg`, `image/jpeg`, `image/png`. Files picked from disk declare no
//! type, in which case the name extension decides.

use image::ImageFormat;
use std::path::Path;

use crate::state::data::SelectedFile;

/// Accepted media types (compared case-insensitively)
const ACCEPTED_MEDIA_TYPES: [&str; 3] = ["image/jpg", "image/jpeg", "image/png"];

/// Accepted name extensions (compared case-insensitively)
const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Whether the file may be uploaded as a receipt
pub fn is_acceptable(file: &SelectedFile) -> bool {
    accepted_format(file).is_some()
}

/// Image format of an acceptable receipt, None when the file is refused
pub fn accepted_format(file: &SelectedFile) -> Option<ImageFormat> {
    let media_type = file.media_type.trim();
    if !media_type.is_empty() {
        return format_for_media_type(media_type);
    }

    let extension = Path::new(&file.name)
        .extension()?
        .to_string_lossy()
        .to_lowercase();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    ImageFormat::from_extension(extension)
}

fn format_for_media_type(media_type: &str) -> Option<ImageFormat> {
    let media_type = media_type.to_ascii_lowercase();
    if !ACCEPTED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return None;
    }

    match media_type.as_str() {
        "image/png" => Some(ImageFormat::Png),
        _ => Some(ImageFormat::Jpeg),
    }
}
