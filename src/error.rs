use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::percentage::{MAX_PERCENTAGE, MIN_PERCENTAGE};

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(#[from] RequestError),
    #[error("Validation error: {0}")]
    ValidationError(#[from] PercentageError),
    #[error("Download error: {0}")]
    DownloadError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single generation call. Cloned into panel events, so every
/// variant carries owned, plain data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request timed out after {0}ms")]
    Timeout(u64),
    #[error("service responded with status {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    #[error("service returned an empty image payload")]
    EmptyBody,
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport failures and timeouts may succeed on a second try. Whether a
    /// status is worth retrying is up to the caller's policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, RequestError::Transport(_) | RequestError::Timeout(_))
    }

    /// Message the service put in its `{"error": ...}` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// The two ways a percentage can be rejected. The display strings are the
/// exact inline messages shown under the input.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum PercentageError {
    #[error("Enter minimum {}%", MIN_PERCENTAGE)]
    BelowMinimum,
    #[error("Enter maximum {}%", MAX_PERCENTAGE)]
    AboveMaximum,
}

pub type Result<T> = std::result::Result<T, PanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_messages() {
        assert_eq!(PercentageError::BelowMinimum.to_string(), "Enter minimum 5%");
        assert_eq!(PercentageError::AboveMaximum.to_string(), "Enter maximum 60%");
    }

    #[test]
    fn test_status_error_display() {
        let bare = RequestError::Status {
            status: 502,
            message: None,
        };
        assert_eq!(bare.to_string(), "service responded with status 502");

        let with_body = RequestError::Status {
            status: 400,
            message: Some("Enter maximum 60%".into()),
        };
        assert_eq!(
            with_body.to_string(),
            "service responded with status 400: Enter maximum 60%"
        );
        assert_eq!(with_body.server_message(), Some("Enter maximum 60%"));
        assert_eq!(with_body.status(), Some(400));
    }
}
