//! Image loading utilities
//!
//! Decodes a photo from disk into a [`SourceImage`].

use anyhow::{Context, Result};
use std::path::Path;

use crate::params::SourceImage;

/// Load a photo from a file path
///
/// Supports PNG, JPEG, GIF and WebP.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    if !is_supported_format(path) {
        anyhow::bail!("Unsupported image format: {:?}", path);
    }
    let img = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;
    Ok(SourceImage::from(img))
}

/// Load a photo from bytes
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<SourceImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
    Ok(SourceImage::from(img))
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_is_supported_format() {
        assert!(is_supported_format(&PathBuf::from("run.png")));
        assert!(is_supported_format(&PathBuf::from("run.JPG")));
        assert!(is_supported_format(&PathBuf::from("run.jpeg")));
        assert!(!is_supported_format(&PathBuf::from("run.gpx")));
        assert!(!is_supported_format(&PathBuf::from("run")));
    }

    #[test]
    fn test_load_from_bytes() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let source = load_image_from_bytes(&png).unwrap();
        assert_eq!(source.dimensions(), (3, 2));
    }

    #[test]
    fn test_rejects_unknown_extension() {
        assert!(load_image(Path::new("notes.txt")).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_image(Path::new("/nonexistent/fitframe/run.jpg")).is_err());
    }
}
