//! # moliyachi-client
//!
//! Request lifecycle plumbing and typed finance API services for the
//! Moliyachi client dashboard, plus the landing site's LLM chat endpoint.
//!
//! ## Overview
//!
//! - **Request registry**: tracks every in-flight operation through a
//!   [`CancellationHandle`](request::CancellationHandle) so that a navigation
//!   can abandon all of them at once.
//! - **Resilient fetch wrapper**: [`ApiClient::perform`](http::ApiClient::perform)
//!   executes one logical call, validates the success envelope and retries
//!   safe (GET) calls with a linear backoff.
//! - **Route-change trigger**: cancels everything tracked whenever the
//!   active route changes.
//! - **Typed services**: cards, goals, transactions, users, dashboard and
//!   shop search, each validating request bodies before sending and payloads
//!   after receiving.
//! - **Chat** (feature `chat`): the `POST /api/chat` endpoint that answers
//!   questions from a static knowledge base through an LLM provider.
//!
//! ## Feature Flags
//!
//! - `chat` (default): landing chat endpoint and the `moliyachi-chat` binary
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use moliyachi_client::config::ClientConfig;
//! use moliyachi_client::request::RequestRegistry;
//! use moliyachi_client::service::FinanceApi;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let registry = Arc::new(RequestRegistry::new());
//! let api = FinanceApi::from_config(&config, Arc::clone(&registry));
//!
//! let goals = api.goals().list(None).await?;
//! println!("{} goals", goals.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use moliyachi_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::domain::*;
    pub use crate::http::{ApiClient, ApiEnvelope, ApiError, ApiErrorKind, RequestOptions};
    pub use crate::request::{CancellationHandle, RequestRegistry, RouteChangeTrigger};
    pub use crate::service::{FinanceApi, ServiceError};
    pub use crate::validation::{FieldError, Validate, ValidationError};
}

pub mod config;
pub mod domain;
pub mod http;
pub mod request;
pub mod service;
pub mod telemetry;
pub mod validation;

#[cfg(feature = "chat")]
pub mod chat;
