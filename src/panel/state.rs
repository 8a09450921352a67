use serde::{Deserialize, Serialize};

use crate::{
    error::RequestError,
    models::{Category, GeneratedImage, GenerationRequest, PercentageInput},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionState {
    #[default]
    None,
    Selected(Category),
}

impl SelectionState {
    pub fn category(&self) -> Option<Category> {
        match self {
            SelectionState::None => None,
            SelectionState::Selected(category) => Some(*category),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, SelectionState::Selected(_))
    }
}

/// Lifecycle of the generation call. At most one request is ever in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Idle,
    InFlight,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestStatus::InFlight)
    }
}

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlock {
    InFlight,
    NoCategory,
    NoPercentage,
    InvalidPercentage,
}

/// Everything the panel knows. Created with the panel, dropped with it.
#[derive(Debug, Default)]
pub struct PanelState {
    pub selection: SelectionState,
    pub percentage: PercentageInput,
    pub status: RequestStatus,
    pub image: Option<GeneratedImage>,
    pub last_error: Option<RequestError>,
    /// The outstanding request while `status` is `InFlight`.
    pub pending: Option<GenerationRequest>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validation_message(&self) -> Option<String> {
        self.percentage.error().map(|e| e.to_string())
    }

    /// `None` when a submission would be accepted.
    pub fn submit_block(&self) -> Option<SubmitBlock> {
        if self.status.is_in_flight() {
            Some(SubmitBlock::InFlight)
        } else if !self.selection.is_selected() {
            Some(SubmitBlock::NoCategory)
        } else if self.percentage.error().is_some() {
            Some(SubmitBlock::InvalidPercentage)
        } else if self.percentage.valid_value().is_none() {
            Some(SubmitBlock::NoPercentage)
        } else {
            None
        }
    }

    pub fn can_submit(&self) -> bool {
        self.submit_block().is_none()
    }

    /// Leaves a finished request's outcome behind once the user edits again.
    pub(crate) fn settle_status(&mut self) {
        if !self.status.is_in_flight() {
            self.status = RequestStatus::Idle;
            self.last_error = None;
        }
    }
}
