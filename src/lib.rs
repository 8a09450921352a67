//! Client panel for the Tensile Elongation image service.
//!
//! The user picks a category (KAM or phase map), enters an elongation
//! percentage between 5 and 60, and asks the remote service for an image,
//! which can then be previewed through a display reference and downloaded.
//!
//! ```no_run
//! use elongation::{Category, HttpImageService, PanelController, ServiceConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> elongation::Result<()> {
//! let service = HttpImageService::new(&ServiceConfig::from_env())?;
//! let controller = PanelController::new(Arc::new(service));
//!
//! controller.select_category(Category::PhaseMap).await;
//! controller.set_percentage("25").await;
//! controller.generate_image().await;
//!
//! if let Some(image) = controller.panel().await.image() {
//!     image.save_to(".")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
pub mod models;
pub mod object_url;
pub mod panel;
pub mod service;

pub use config::{PanelConfig, RetryPolicy, ServiceConfig};
pub use controller::PanelController;
pub use error::{PanelError, PercentageError, RequestError, Result};
pub use models::{
    Category, GeneratedImage, GenerationRequest, ImageFormat, ImagePayload, PercentageInput,
};
pub use object_url::{ObjectUrl, ObjectUrlRegistry};
pub use panel::{
    ImageRequestPanel, PanelCommand, PanelEvent, PanelState, PanelView, RequestStatus,
    SelectionState,
};
pub use service::{HttpImageService, ImageService};
