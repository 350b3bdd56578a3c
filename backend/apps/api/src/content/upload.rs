//! Admin image upload
//!
//! Reads the `image` part of a multipart form and returns it as a base64
//! data URL, which articles store directly.

use axum::extract::Multipart;
use platform::crypto::to_base64;

use super::error::{ContentError, ContentResult};

pub const IMAGE_PART: &str = "image";
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, to_base64(&self.bytes))
    }
}

pub fn is_allowed_type(mime: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&mime)
}

/// Find the `image` part. The type is checked before any bytes are read and
/// the size while streaming.
pub async fn read_image(mut multipart: Multipart) -> ContentResult<UploadedImage> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ContentError::Multipart(e.body_text()))?
    {
        if field.name() != Some(IMAGE_PART) {
            continue;
        }

        let mime = field
            .content_type()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !is_allowed_type(&mime) {
            return Err(ContentError::UnsupportedImageType);
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ContentError::Multipart(e.body_text()))?
        {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(ContentError::ImageTooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(ContentError::NoImage);
        }

        tracing::info!(mime = %mime, size = bytes.len(), "Image uploaded");
        return Ok(UploadedImage { mime, bytes });
    }

    Err(ContentError::NoImage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_types() {
        assert!(is_allowed_type("image/webp"));
        assert!(is_allowed_type("image/jpg"));
        assert!(!is_allowed_type("image/svg+xml"));
        assert!(!is_allowed_type("text/html"));
    }

    #[test]
    fn test_data_url() {
        let image = UploadedImage {
            mime: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw==");
    }
}
