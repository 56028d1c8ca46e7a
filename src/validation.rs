//! Field-level validation of request bodies and response payloads.
//!
//! Every typed payload implements [`Validate`]. Services call it on request
//! bodies before anything is sent and on decoded `data` after a successful
//! envelope, so a [`ValidationError`] always says which side was wrong.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Field Error
// =============================================================================

/// Field-level error for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field that failed validation.
    pub field: String,
    /// Error message for this field.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}: {}", self.field, self.message)
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Which side of a call produced invalid data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// A request body built by the caller.
    Request,
    /// A payload returned by the backend.
    Response,
}

impl fmt::Display for Boundary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => formatter.write_str("request"),
            Self::Response => formatter.write_str("response"),
        }
    }
}

/// One or more field errors on one side of a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {boundary}: {}", summarize(.errors))]
pub struct ValidationError {
    /// Where the invalid data came from.
    pub boundary: Boundary,
    /// Field-level errors, never empty.
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub const fn new(boundary: Boundary, errors: Vec<FieldError>) -> Self {
        Self { boundary, errors }
    }

    /// Creates a validation error with a single field error.
    #[must_use]
    pub fn single(boundary: Boundary, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(boundary, vec![FieldError::new(field, message)])
    }

    /// A response payload that could not be decoded at all.
    #[must_use]
    pub fn undecodable(error: &serde_json::Error) -> Self {
        Self::single(Boundary::Response, "data", error.to_string())
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validate
// =============================================================================

/// A payload with field-level rules.
pub trait Validate {
    /// Checks the payload, tagging failures with `boundary`.
    ///
    /// # Errors
    ///
    /// Returns every rule violation found.
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self, boundary: Boundary) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        for (index, item) in self.iter().enumerate() {
            if let Err(error) = item.validate(boundary) {
                errors.extend(error.errors.into_iter().map(|field| {
                    FieldError::new(format!("[{index}].{}", field.field), field.message)
                }));
            }
        }
        Validator::from_errors(boundary, errors).finish()
    }
}

/// Collects field errors for one payload.
///
/// # Examples
///
/// ```rust
/// use moliyachi_client::validation::{Boundary, Validator};
///
/// let result = Validator::new(Boundary::Request)
///     .require_non_empty("name", "")
///     .positive("target_amount", 1_000.0)
///     .finish();
///
/// let error = result.unwrap_err();
/// assert_eq!(error.message_for("name"), Some("name is required"));
/// assert_eq!(error.errors.len(), 1);
/// ```
#[derive(Debug)]
#[must_use]
pub struct Validator {
    boundary: Boundary,
    errors: Vec<FieldError>,
}

impl Validator {
    /// Starts a validation pass.
    pub const fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            errors: Vec::new(),
        }
    }

    const fn from_errors(boundary: Boundary, errors: Vec<FieldError>) -> Self {
        Self { boundary, errors }
    }

    /// Records a custom failure when `condition` is false.
    pub fn check(mut self, condition: bool, field: &str, message: impl Into<String>) -> Self {
        if !condition {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// The value must contain a non-whitespace character.
    pub fn require_non_empty(self, field: &str, value: &str) -> Self {
        self.check(!value.trim().is_empty(), field, format!("{field} is required"))
    }

    /// The value must be a finite number `>= 0`.
    pub fn non_negative(self, field: &str, value: f64) -> Self {
        self.check(
            value.is_finite() && value >= 0.0,
            field,
            format!("{field} must not be negative"),
        )
    }

    /// The value must be a finite number `> 0`.
    pub fn positive(self, field: &str, value: f64) -> Self {
        self.check(
            value.is_finite() && value > 0.0,
            field,
            format!("{field} must be greater than zero"),
        )
    }

    /// Applies [`non_negative`](Self::non_negative) when a value is present.
    pub fn non_negative_opt(self, field: &str, value: Option<f64>) -> Self {
        match value {
            Some(value) => self.non_negative(field, value),
            None => self,
        }
    }

    /// The value must look like `local@domain.tld`.
    pub fn email(self, field: &str, value: &str) -> Self {
        self.check(looks_like_email(value), field, "Invalid email")
    }

    /// The value must be an absolute `http` or `https` URL.
    pub fn http_url(self, field: &str, value: &str) -> Self {
        let valid = Url::parse(value)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
        self.check(valid, field, "Invalid url")
    }

    /// Merges the errors of a nested payload under `prefix`.
    pub fn nested<V: Validate>(mut self, prefix: &str, value: &V) -> Self {
        if let Err(error) = value.validate(self.boundary) {
            self.errors.extend(
                error
                    .errors
                    .into_iter()
                    .map(|field| FieldError::new(format!("{prefix}.{}", field.field), field.message)),
            );
        }
        self
    }

    /// Ends the pass.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when any rule failed.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.boundary, self.errors))
        }
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern")
});

fn looks_like_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}
