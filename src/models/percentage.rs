use serde::{Deserialize, Serialize};

use crate::error::PercentageError;

pub const MIN_PERCENTAGE: f64 = 5.0;
pub const MAX_PERCENTAGE: f64 = 60.0;

/// Checks a parsed value against the inclusive `[MIN_PERCENTAGE, MAX_PERCENTAGE]` range.
pub fn validate(value: f64) -> Result<f64, PercentageError> {
    if value.is_nan() || value < MIN_PERCENTAGE {
        Err(PercentageError::BelowMinimum)
    } else if value > MAX_PERCENTAGE {
        Err(PercentageError::AboveMaximum)
    } else {
        Ok(value)
    }
}

/// Formats a percentage the way it appears in file names: `25` for whole
/// values, `7.5` otherwise.
pub fn format_percentage(value: f64) -> String {
    format!("{}", value)
}

/// What the user typed into the percentage field.
///
/// The raw text is always kept for display, even when it does not parse or
/// falls outside the accepted range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentageInput {
    raw: String,
    value: Option<f64>,
    error: Option<PercentageError>,
}

impl PercentageInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `raw` and derives the validation error.
    ///
    /// An empty field is not an error: it simply leaves the percentage unset,
    /// which keeps submission disabled. Text that does not parse as a number
    /// is reported as below the minimum.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self {
                raw: raw.to_string(),
                value: None,
                error: None,
            };
        }

        match trimmed.parse::<f64>() {
            Ok(value) if !value.is_nan() => Self {
                raw: raw.to_string(),
                value: Some(value),
                error: validate(value).err(),
            },
            _ => Self {
                raw: raw.to_string(),
                value: None,
                error: Some(PercentageError::BelowMinimum),
            },
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn error(&self) -> Option<PercentageError> {
        self.error
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// The value to submit, only when it is present and in range.
    pub fn valid_value(&self) -> Option<f64> {
        match (self.value, self.error) {
            (Some(value), None) => Some(value),
            _ => None,
        }
    }
}
