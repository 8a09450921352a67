use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::{PanelError, Result},
    models::{category::Category, percentage::format_percentage},
    object_url::{ObjectUrl, ObjectUrlRegistry},
};

/// JSON body of `POST /generate_image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(skip)]
    pub request_id: Uuid,
    pub percentage: f64,
    #[serde(rename = "type")]
    pub category: Category,
}

impl GenerationRequest {
    pub fn new(category: Category, percentage: f64) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            percentage,
            category,
        }
    }
}

/// Raw successful response from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Unknown,
}

impl ImageFormat {
    /// Identifies the format from magic bytes, falling back to the
    /// `Content-Type` the service declared.
    pub fn detect(bytes: &[u8], content_type: Option<&str>) -> Self {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return ImageFormat::Png;
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return ImageFormat::Jpeg;
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return ImageFormat::Gif;
        }
        if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            return ImageFormat::Webp;
        }

        match content_type.map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase()) {
            Some(ct) if ct == "image/png" => ImageFormat::Png,
            Some(ct) if ct == "image/jpeg" || ct == "image/jpg" => ImageFormat::Jpeg,
            Some(ct) if ct == "image/gif" => ImageFormat::Gif,
            Some(ct) if ct == "image/webp" => ImageFormat::Webp,
            _ => ImageFormat::Unknown,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Suggested download name for an image generated at `percentage`.
pub fn download_filename(percentage: f64) -> String {
    format!("elongation_{}.png", format_percentage(percentage))
}

/// A generated image owned by the panel, together with its display reference.
/// Dropping it revokes the reference.
#[derive(Debug)]
pub struct GeneratedImage {
    request_id: Uuid,
    category: Category,
    percentage: f64,
    format: ImageFormat,
    bytes: Arc<[u8]>,
    object_url: ObjectUrl,
}

impl GeneratedImage {
    pub fn new(
        request: &GenerationRequest,
        payload: ImagePayload,
        registry: &ObjectUrlRegistry,
    ) -> Self {
        let format = ImageFormat::detect(&payload.bytes, payload.content_type.as_deref());
        let bytes: Arc<[u8]> = Arc::from(payload.bytes);
        let object_url = registry.create(Arc::clone(&bytes), format.mime_type());

        Self {
            request_id: request.request_id,
            category: request.category,
            percentage: request.percentage,
            format,
            bytes,
            object_url,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn object_url(&self) -> &ObjectUrl {
        &self.object_url
    }

    pub fn download_filename(&self) -> String {
        download_filename(self.percentage)
    }

    /// Writes the image into `dir` under its download name and returns the path.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            PanelError::DownloadError(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = dir.join(self.download_filename());
        std::fs::write(&path, &self.bytes).map_err(|e| {
            PanelError::DownloadError(format!("cannot write {}: {}", path.display(), e))
        })?;

        log::info!("💾 Image saved to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_request_body_shape() {
        let request = GenerationRequest::new(Category::PhaseMap, 25.0);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "percentage": 25.0, "type": "phase_map" })
        );
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(ImageFormat::detect(&PNG_HEADER, None), ImageFormat::Png);
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0], None),
            ImageFormat::Jpeg
        );
        assert_eq!(
            ImageFormat::detect(b"not an image", Some("image/png; charset=binary")),
            ImageFormat::Png
        );
        assert_eq!(
            ImageFormat::detect(b"not an image", None),
            ImageFormat::Unknown
        );
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(download_filename(25.0), "elongation_25.png");
        assert_eq!(download_filename(7.5), "elongation_7.5.png");
    }

    #[test]
    fn test_save_to_writes_payload() {
        let registry = ObjectUrlRegistry::new();
        let request = GenerationRequest::new(Category::Kam, 12.5);
        let payload = ImagePayload::new(PNG_HEADER.to_vec());
        let image = GeneratedImage::new(&request, payload, &registry);

        let dir = tempfile::tempdir().unwrap();
        let path = image.save_to(dir.path().join("downloads")).unwrap();
        assert!(path.ends_with("elongation_12.5.png"));
        assert_eq!(std::fs::read(&path).unwrap(), PNG_HEADER.to_vec());
    }

    #[test]
    fn test_drop_releases_reference() {
        let registry = ObjectUrlRegistry::new();
        let request = GenerationRequest::new(Category::Kam, 30.0);
        let payload = ImagePayload::new(PNG_HEADER.to_vec());
        let image = GeneratedImage::new(&request, payload, &registry);
        assert_eq!(registry.live_count(), 1);
        drop(image);
        assert_eq!(registry.live_count(), 0);
    }
}
