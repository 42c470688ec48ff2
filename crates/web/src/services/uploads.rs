//! Photo storage for store listings.
//!
//! Uploaded photos are validated by MIME type, resized down to a bounded
//! width, and written to the uploads directory under a generated filename.
//! Only the filename is stored on the store row.

use std::path::PathBuf;

use image::ImageFormat;
use thiserror::Error;
use uuid::Uuid;

/// Maximum width of a stored photo, in pixels. Larger uploads are scaled
/// down preserving aspect ratio; smaller ones are kept as-is.
const MAX_PHOTO_WIDTH: u32 = 800;

/// Errors that can occur while storing a photo.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The uploaded file is not an image.
    #[error("that filetype isn't allowed")]
    NotAnImage,

    /// The image data could not be decoded.
    #[error("could not read the uploaded image: {0}")]
    Decode(#[from] image::ImageError),

    /// Filesystem error while writing the photo.
    #[error("failed to store photo: {0}")]
    Io(#[from] std::io::Error),

    /// The resize task was cancelled or panicked.
    #[error("photo processing failed")]
    Processing,
}

/// Stores uploaded photos on the local filesystem.
#[derive(Clone)]
pub struct PhotoStore {
    uploads_dir: PathBuf,
}

impl PhotoStore {
    /// Create a photo store rooted at `uploads_dir`. The directory is
    /// created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(uploads_dir: PathBuf) -> Result<Self, UploadError> {
        std::fs::create_dir_all(&uploads_dir)?;
        Ok(Self { uploads_dir })
    }

    /// Validate, resize, and persist an uploaded photo.
    ///
    /// Returns the generated filename to store on the store row. The MIME
    /// type comes from the multipart part; anything outside `image/*` is
    /// rejected before decoding.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NotAnImage` for non-image uploads, or a decode
    /// or I/O error if processing fails.
    pub async fn store(&self, content_type: &str, data: Vec<u8>) -> Result<String, UploadError> {
        let extension = extension_for(content_type).ok_or(UploadError::NotAnImage)?;
        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.uploads_dir.join(&filename);

        // Decoding and resizing are CPU-bound; keep them off the runtime.
        let encoded = tokio::task::spawn_blocking(move || resize_to_width(&data))
            .await
            .map_err(|_| UploadError::Processing)??;

        tokio::fs::write(&path, encoded).await?;

        tracing::info!(filename = %filename, "Stored uploaded photo");
        Ok(filename)
    }
}

/// Map an `image/*` MIME type to a file extension. Returns `None` for
/// anything that is not an image.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        // GIFs are re-encoded as PNG by the resize step
        "image/gif" => Some("png"),
        "image/webp" => Some("webp"),
        other if other.starts_with("image/") => Some("jpg"),
        _ => None,
    }
}

/// Decode `data`, scale it down to at most [`MAX_PHOTO_WIDTH`] pixels wide,
/// and re-encode in the original format (GIFs come back as PNG).
fn resize_to_width(data: &[u8]) -> Result<Vec<u8>, UploadError> {
    let format = image::guess_format(data)?;
    let img = image::load_from_memory(data)?;

    let img = if img.width() > MAX_PHOTO_WIDTH {
        let height = (u64::from(img.height()) * u64::from(MAX_PHOTO_WIDTH) / u64::from(img.width()))
            .try_into()
            .unwrap_or(u32::MAX);
        img.resize(
            MAX_PHOTO_WIDTH,
            height,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        img
    };

    let format = match format {
        // Animated GIFs lose animation on resize; a still frame is fine.
        ImageFormat::Gif => ImageFormat::Png,
        other => other,
    };

    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, format)?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encoded_image(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_extension_for_mime_types() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/gif"), Some("png"));
        assert_eq!(extension_for("image/avif"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for("text/html"), None);
    }

    #[test]
    fn test_resize_shrinks_wide_images() {
        let data = encoded_image(1600, 400);
        let resized = resize_to_width(&data).unwrap();
        let img = image::load_from_memory(&resized).unwrap();
        assert_eq!(img.width(), MAX_PHOTO_WIDTH);
        assert_eq!(img.height(), 200);
    }

    #[test]
    fn test_resize_keeps_small_images() {
        let data = encoded_image(300, 200);
        let resized = resize_to_width(&data).unwrap();
        let img = image::load_from_memory(&resized).unwrap();
        assert_eq!(img.width(), 300);
        assert_eq!(img.height(), 200);
    }

    #[test]
    fn test_resize_rejects_garbage() {
        assert!(resize_to_width(b"not an image").is_err());
    }
}
