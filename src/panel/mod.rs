//! The image request panel.
//!
//! State changes only through [`ImageRequestPanel::update`] (or the named
//! operations it dispatches to). Nothing here performs I/O: submitting yields
//! a [`PanelCommand`] that the caller executes, then feeds the outcome back as
//! [`PanelEvent::ImageReceived`].

pub mod state;
pub mod view;

use uuid::Uuid;

use crate::{
    error::RequestError,
    models::{Category, GeneratedImage, GenerationRequest, ImagePayload, PercentageInput},
    object_url::ObjectUrlRegistry,
};

pub use state::{PanelState, RequestStatus, SelectionState, SubmitBlock};
pub use view::PanelView;

/// The four things that can happen to the panel.
#[derive(Debug, Clone)]
pub enum PanelEvent {
    /// A category trigger was pressed
    SelectCategory(Category),
    /// The percentage field changed
    SetPercentage(String),
    /// The submit trigger was pressed
    Generate,
    /// The service answered the outstanding request
    ImageReceived {
        request_id: Uuid,
        result: Result<ImagePayload, RequestError>,
    },
}

/// Work the panel asks its driver to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    FetchImage(GenerationRequest),
}

#[derive(Debug, Default)]
pub struct ImageRequestPanel {
    state: PanelState,
    registry: ObjectUrlRegistry,
}

impl ImageRequestPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing registry for display references, so a frontend can
    /// resolve the `blob:` URLs the panel hands out.
    pub fn with_registry(registry: ObjectUrlRegistry) -> Self {
        Self {
            state: PanelState::new(),
            registry,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.registry
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        self.state.image.as_ref()
    }

    pub fn status(&self) -> RequestStatus {
        self.state.status
    }

    pub fn can_submit(&self) -> bool {
        self.state.can_submit()
    }

    pub fn view(&self) -> PanelView {
        PanelView::from_state(&self.state)
    }

    pub fn update(&mut self, event: PanelEvent) -> Option<PanelCommand> {
        match event {
            PanelEvent::SelectCategory(category) => {
                self.select_category(category);
                None
            }
            PanelEvent::SetPercentage(raw) => {
                self.set_percentage(&raw);
                None
            }
            PanelEvent::Generate => self.generate_image().map(PanelCommand::FetchImage),
            PanelEvent::ImageReceived { request_id, result } => {
                self.receive_image(request_id, result);
                None
            }
        }
    }

    /// Selects a category, dropping any generated image and validation error.
    ///
    /// A valid percentage survives the switch; an invalid entry is discarded
    /// together with its error.
    pub fn select_category(&mut self, category: Category) {
        log::debug!("Category selected: {}", category);

        self.state.selection = SelectionState::Selected(category);
        self.state.image = None;
        if self.state.percentage.error().is_some() {
            self.state.percentage = PercentageInput::new();
        }
        self.state.settle_status();
    }

    pub fn set_percentage(&mut self, raw: &str) {
        self.state.percentage = PercentageInput::parse(raw);
        if let Some(error) = self.state.percentage.error() {
            log::debug!("Percentage '{}' rejected: {}", raw, error);
        }
        self.state.settle_status();
    }

    /// Starts a generation request if the panel allows it.
    ///
    /// Returns the request to send, or `None` when the submission is refused
    /// (no category, no valid percentage, or a request already in flight).
    pub fn generate_image(&mut self) -> Option<GenerationRequest> {
        if let Some(block) = self.state.submit_block() {
            log::debug!("Generate ignored: {:?}", block);
            return None;
        }

        let category = self.state.selection.category()?;
        let percentage = self.state.percentage.valid_value()?;
        let request = GenerationRequest::new(category, percentage);

        self.state.status = RequestStatus::InFlight;
        self.state.pending = Some(request.clone());
        self.state.image = None;
        self.state.last_error = None;

        log::info!(
            "📤 Submitting {} at {}% [req:{}]",
            category.display_name(),
            percentage,
            request.request_id
        );
        Some(request)
    }

    /// Applies the service's answer to the outstanding request. Answers that
    /// do not match it are ignored.
    pub fn receive_image(
        &mut self,
        request_id: Uuid,
        result: Result<ImagePayload, RequestError>,
    ) {
        let request = match self.state.pending.take() {
            Some(pending) if pending.request_id == request_id => pending,
            pending => {
                log::warn!(
                    "Ignoring response for {} while panel is {:?}",
                    request_id,
                    self.state.status
                );
                self.state.pending = pending;
                return;
            }
        };

        match result {
            Ok(payload) => {
                let image = GeneratedImage::new(&request, payload, &self.registry);
                log::info!(
                    "🖼️  Image ready: {} ({} bytes, {}) [req:{}]",
                    image.object_url(),
                    image.bytes().len(),
                    image.format().mime_type(),
                    request_id
                );
                // Replacing the previous image revokes its reference.
                self.state.image = Some(image);
                self.state.status = RequestStatus::Completed;
            }
            Err(error) => {
                log::error!("❌ Error generating image: {} [req:{}]", error, request_id);
                self.state.image = None;
                self.state.last_error = Some(error);
                self.state.status = RequestStatus::Failed;
            }
        }
    }
}
