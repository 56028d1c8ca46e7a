//! API error taxonomy.
//!
//! | Kind | Cause | Status |
//! |---|---|---|
//! | `Transport` | connection refused, DNS failure, invalid URL | synthetic `0` |
//! | `Timeout` | an attempt exceeded its time limit | synthetic `0` |
//! | `Http` | non-2xx status | the HTTP status |
//! | `Envelope` | 2xx status but `is_success: false` | the HTTP status |
//! | `MalformedResponse` | body is not JSON | the HTTP status |
//! | `Cancelled` | the request handle was cancelled | synthetic `0` |

use std::time::Duration;

use thiserror::Error;

use super::transport::TransportError;

/// Status recorded when no HTTP response was received.
pub const SYNTHETIC_STATUS: u16 = 0;

/// Message used when the backend does not provide one.
pub const FALLBACK_MESSAGE: &str = "API request failed.";

/// Statuses treated as transient under [`RetryEligibility::Transient`](super::RetryEligibility::Transient).
const TRANSIENT_STATUSES: [u16; 5] = [408, 429, 502, 503, 504];

/// Classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The request never produced a response.
    Transport,
    /// An attempt exceeded the configured time limit.
    Timeout,
    /// The backend answered with a non-2xx status.
    Http,
    /// The backend answered 2xx but flagged the envelope as failed.
    Envelope,
    /// The body could not be parsed as JSON.
    MalformedResponse,
    /// The request was abandoned through its cancellation handle.
    Cancelled,
}

/// A failed backend call.
///
/// Carries the HTTP status (or [`SYNTHETIC_STATUS`]), a message suitable for
/// logging and the URL that was called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status}, {url})")]
pub struct ApiError {
    /// What went wrong.
    pub kind: ApiErrorKind,
    /// HTTP status, or [`SYNTHETIC_STATUS`] when there was no response.
    pub status: u16,
    /// Backend message or a local description.
    pub message: String,
    /// The full URL of the request.
    pub url: String,
    /// Error details from the envelope, if any.
    pub errors: Vec<String>,
}

impl ApiError {
    /// Creates an error with no envelope details.
    #[must_use]
    pub fn new(
        kind: ApiErrorKind,
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            url: url.into(),
            errors: Vec::new(),
        }
    }

    /// A transport-level failure.
    #[must_use]
    pub fn transport(url: impl Into<String>, error: &TransportError) -> Self {
        let kind = match error {
            TransportError::Timeout(_) => ApiErrorKind::Timeout,
            TransportError::Connect(_) | TransportError::Request(_) => ApiErrorKind::Transport,
        };
        Self::new(kind, SYNTHETIC_STATUS, error.to_string(), url)
    }

    /// An attempt that exceeded `limit`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Timeout in ms will not exceed u64
    pub fn timeout(url: impl Into<String>, limit: Duration) -> Self {
        Self::new(
            ApiErrorKind::Timeout,
            SYNTHETIC_STATUS,
            format!("Timeout after {}ms", limit.as_millis() as u64),
            url,
        )
    }

    /// A non-2xx response.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Http, status, message, url)
    }

    /// A 2xx response whose envelope reports failure.
    #[must_use]
    pub fn envelope(status: u16, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Envelope, status, message, url)
    }

    /// A body that is not valid JSON. The raw text is kept in the message.
    #[must_use]
    pub fn malformed(status: u16, raw_text: &str, url: impl Into<String>) -> Self {
        let message = if raw_text.is_empty() {
            "Invalid JSON response from API.".to_string()
        } else {
            format!("Invalid JSON response: {raw_text}")
        };
        Self::new(ApiErrorKind::MalformedResponse, status, message, url)
    }

    /// A request abandoned through its handle.
    #[must_use]
    pub fn cancelled(url: impl Into<String>) -> Self {
        Self::new(
            ApiErrorKind::Cancelled,
            SYNTHETIC_STATUS,
            "Request cancelled",
            url,
        )
    }

    /// Attaches envelope error details.
    #[must_use]
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }

    /// `true` for cancelled requests, which callers treat as "no update".
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == ApiErrorKind::Cancelled
    }

    /// `true` for failures that may succeed on a later attempt: transport
    /// errors, timeouts and HTTP 408/429/502/503/504.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self.kind {
            ApiErrorKind::Transport | ApiErrorKind::Timeout => true,
            ApiErrorKind::Http => TRANSIENT_STATUSES.contains(&self.status),
            ApiErrorKind::Envelope | ApiErrorKind::MalformedResponse | ApiErrorKind::Cancelled => {
                false
            }
        }
    }
}
