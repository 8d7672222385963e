//! Field validation shared by the record types.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("phone pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern is valid")
});

/// A record failed validation before reaching storage.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("invalid {field}: {value}")]
    InvalidFormat { field: &'static str, value: String },
}

pub type ValidationResult = Result<(), ValidationError>;

pub(crate) fn require(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

pub(crate) fn phone(field: &'static str, value: &str) -> ValidationResult {
    require(field, value)?;
    if !PHONE_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn email(field: &'static str, value: Option<&str>) -> ValidationResult {
    match value {
        Some(v) if !EMAIL_RE.is_match(v.trim()) => Err(ValidationError::InvalidFormat {
            field,
            value: v.to_string(),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn non_negative(field: &'static str, value: Option<f64>) -> ValidationResult {
    match value {
        Some(v) if v.is_nan() => Err(ValidationError::InvalidFormat {
            field,
            value: v.to_string(),
        }),
        Some(v) if v < 0.0 => Err(ValidationError::Negative(field)),
        _ => Ok(()),
    }
}

pub(crate) fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> ValidationResult {
    if value < min || value > max || value.is_nan() {
        return Err(ValidationError::OutOfRange { field, min, max });
    }
    Ok(())
}
