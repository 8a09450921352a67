pub mod client;

use crate::{
    error::RequestError,
    models::{GenerationRequest, ImagePayload},
};
use async_trait::async_trait;

pub use client::HttpImageService;

/// The remote Image Generation Service as seen by the panel.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Requests one image. Success carries the binary payload; every other
    /// outcome is a [`RequestError`].
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<ImagePayload, RequestError>;
}
