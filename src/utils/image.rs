//! Page image file recognition.

use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif", "webp"];

/// Normalized extension of a supported image file.
pub fn image_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|candidate| **candidate == ext)
        .map(|candidate| match *candidate {
            "jpeg" => "jpg",
            "tif" => "tiff",
            other => other,
        })
}

/// Whether a path looks like a page image Tesseract can read.
pub fn is_supported_image(path: &Path) -> bool {
    image_extension(path).is_some()
}
