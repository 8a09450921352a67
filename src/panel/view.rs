use serde::Serialize;

use crate::{
    models::{Category, MAX_PERCENTAGE, MIN_PERCENTAGE},
    panel::state::{PanelState, RequestStatus},
};

pub const TITLE: &str = "Tensile Elongation Predictor";
pub const PERCENTAGE_PLACEHOLDER: &str = "Enter elongation percentage";
pub const SUBMIT_LABEL: &str = "Generate Image";
pub const SUBMIT_LABEL_BUSY: &str = "Generating...";
pub const PREVIEW_HEADING: &str = "Generated Image:";
pub const PREVIEW_ALT: &str = "Generated Elongation";
pub const DOWNLOAD_LABEL: &str = "Download Image";
pub const FAILURE_MESSAGE: &str = "Could not generate image. Please try again.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrigger {
    pub category: Category,
    pub label: &'static str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageField {
    pub value: String,
    pub placeholder: &'static str,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImagePreview {
    pub heading: &'static str,
    pub alt: &'static str,
    pub object_url: String,
    pub mime_type: &'static str,
    pub byte_len: usize,
    pub download_label: &'static str,
    pub download_filename: String,
}

/// Render-ready snapshot of the panel. Frontends draw this and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub title: &'static str,
    pub category_triggers: Vec<CategoryTrigger>,
    /// Only present once a category is chosen.
    pub percentage_field: Option<PercentageField>,
    /// Shown under the percentage field, so never without it.
    pub validation_message: Option<String>,
    /// Shown together with the percentage field.
    pub submit: Option<SubmitButton>,
    pub is_loading: bool,
    pub failure_message: Option<String>,
    pub preview: Option<ImagePreview>,
    pub status: RequestStatus,
}

impl PanelView {
    pub fn from_state(state: &PanelState) -> Self {
        let selected = state.selection.category();
        let is_loading = state.status.is_in_flight();

        let category_triggers = Category::ALL
            .iter()
            .map(|&category| CategoryTrigger {
                category,
                label: category.trigger_label(),
                selected: selected == Some(category),
            })
            .collect();

        let percentage_field = selected.map(|_| PercentageField {
            value: state.percentage.raw().to_string(),
            placeholder: PERCENTAGE_PLACEHOLDER,
            min: MIN_PERCENTAGE,
            max: MAX_PERCENTAGE,
        });

        let submit = selected.map(|_| SubmitButton {
            label: if is_loading {
                SUBMIT_LABEL_BUSY
            } else {
                SUBMIT_LABEL
            },
            enabled: state.can_submit(),
        });

        let failure_message = match (state.status, &state.last_error) {
            (RequestStatus::Failed, Some(error)) => Some(match error.server_message() {
                Some(message) => format!("Could not generate image: {}", message),
                None => FAILURE_MESSAGE.to_string(),
            }),
            (RequestStatus::Failed, None) => Some(FAILURE_MESSAGE.to_string()),
            _ => None,
        };

        let preview = state.image.as_ref().map(|image| ImagePreview {
            heading: PREVIEW_HEADING,
            alt: PREVIEW_ALT,
            object_url: image.object_url().to_string(),
            mime_type: image.format().mime_type(),
            byte_len: image.bytes().len(),
            download_label: DOWNLOAD_LABEL,
            download_filename: image.download_filename(),
        });

        PanelView {
            title: TITLE,
            category_triggers,
            percentage_field,
            validation_message: selected.and_then(|_| state.validation_message()),
            submit,
            is_loading,
            failure_message,
            preview,
            status: state.status,
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.submit.as_ref().map_or(false, |s| s.enabled)
    }
}
