//! The resilient fetch wrapper and its building blocks.
//!
//! [`ApiClient::perform`] runs one logical call:
//!
//! 1. Register a [`CancellationHandle`](crate::request::CancellationHandle).
//! 2. Send an attempt through the [`Transport`].
//! 3. Parse the body with [`parse_response`] and check the envelope.
//! 4. On failure, back off and retry according to the [`RetryPolicy`] (GET only).
//! 5. Settle the handle.

mod client;
mod envelope;
mod error;
mod retry;
mod transport;

pub use client::{ApiClient, RequestOptions, parse_response};
pub use envelope::{ApiEnvelope, EMPTY_SUCCESS_MESSAGE};
pub use error::{ApiError, ApiErrorKind, FALLBACK_MESSAGE, SYNTHETIC_STATUS};
pub use retry::{RetryEligibility, RetryPolicy};
pub use transport::{HttpRequest, RawResponse, ReqwestTransport, Transport, TransportError};
