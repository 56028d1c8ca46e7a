//! The seam between the fetch wrapper and the networking stack.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

/// Failure raised before any HTTP response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Failed to establish a connection.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The transport's own time limit elapsed.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Any other request failure (invalid header, body read, reset, ...).
    #[error("Request failed: {0}")]
    Request(String),
}

/// One HTTP request as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header pairs, in sending order.
    pub headers: Vec<(String, String)>,
    /// Serialized body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Looks up a header value, ignoring ASCII case of the name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body text of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body text, possibly empty.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Performs a single HTTP exchange.
///
/// Implementations must not retry; retrying is the caller's policy.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the raw response.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        (**self).send(request)
    }
}

// =============================================================================
// reqwest Transport
// =============================================================================

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport with a default client and no time limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Creates a transport whose client aborts any exchange after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] when the TLS backend cannot be initialised.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Request(error.to_string()))?;
        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        let client = self.client.clone();
        let timeout = self.timeout;
        async move { execute_reqwest(&client, timeout, request).await }
    }
}

async fn execute_reqwest(
    client: &reqwest::Client,
    timeout: Option<Duration>,
    request: HttpRequest,
) -> Result<RawResponse, TransportError> {
    let map_error = |error: reqwest::Error| map_reqwest_error(&error, timeout);

    let mut builder = client.request(request.method, &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().await.map_err(map_error)?;
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_error)?;

    Ok(RawResponse { status, body })
}

#[allow(clippy::cast_possible_truncation)] // Timeout in ms will not exceed u64
fn map_reqwest_error(error: &reqwest::Error, timeout: Option<Duration>) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout.map_or(0, |limit| limit.as_millis() as u64))
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
