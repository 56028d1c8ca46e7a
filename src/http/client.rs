//! The resilient fetch wrapper.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::ApiEnvelope;
use super::error::{ApiError, FALLBACK_MESSAGE};
use super::retry::RetryPolicy;
use super::transport::{HttpRequest, RawResponse, ReqwestTransport, Transport, TransportError};
use crate::config::ClientConfig;
use crate::request::{CancellationHandle, RequestRegistry};

/// Status attached to payload decoding failures, which only happen after a 2xx.
const SUCCESS_STATUS: u16 = 200;

// =============================================================================
// Request Options
// =============================================================================

/// Method, body, headers, path segments and query parameters of one logical call.
///
/// Defaults to a GET with no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// HTTP method. Only GET is retried.
    pub method: Method,
    /// Serialized JSON body.
    pub body: Option<String>,
    /// Extra headers; they override the defaults on name collision.
    pub headers: Vec<(String, String)>,
    /// Path segments appended after the path, each percent-encoded on its own.
    pub segments: Vec<String>,
    /// Query parameters, percent-encoded when the URL is built.
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    /// Options for `method` with no body.
    #[must_use]
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            segments: Vec::new(),
            query: Vec::new(),
        }
    }

    /// A GET request.
    #[must_use]
    pub const fn get() -> Self {
        Self::new(Method::GET)
    }

    /// A POST request with a serialized body.
    #[must_use]
    pub fn post(body: impl Into<String>) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    /// A PUT request with a serialized body.
    #[must_use]
    pub fn put(body: impl Into<String>) -> Self {
        Self::new(Method::PUT).with_body(body)
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends one path segment, such as an id or a username.
    ///
    /// `/`, `?` and other reserved characters are encoded, so the value
    /// cannot escape its slot.
    #[must_use]
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

// =============================================================================
// API Client
// =============================================================================

/// Executes logical calls against the finance backend.
///
/// Every call registers one [`CancellationHandle`](crate::request::CancellationHandle)
/// in the shared [`RequestRegistry`] for its whole duration, attempts and
/// backoffs included. Cancelling that handle aborts the call with an
/// [`ApiErrorKind::Cancelled`](super::ApiErrorKind::Cancelled) error.
pub struct ApiClient<T> {
    transport: T,
    base_url: String,
    registry: Arc<RequestRegistry>,
    policy: RetryPolicy,
    attempt_timeout: Option<Duration>,
}

impl ApiClient<ReqwestTransport> {
    /// Builds a reqwest-backed client from configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig, registry: Arc<RequestRegistry>) -> Self {
        Self::new(ReqwestTransport::new(), &config.api_base_url, registry)
            .with_retry_policy(config.retry_policy())
            .with_attempt_timeout(config.attempt_timeout)
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client with the default retry policy and no attempt timeout.
    #[must_use]
    pub fn new(transport: T, base_url: impl Into<String>, registry: Arc<RequestRegistry>) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            registry,
            policy: RetryPolicy::default(),
            attempt_timeout: None,
        }
    }

    /// Replaces the retry policy used for safe methods.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Limits how long a single attempt may take.
    #[must_use]
    pub const fn with_attempt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// The registry the client tracks its calls in.
    #[must_use]
    pub const fn registry(&self) -> &Arc<RequestRegistry> {
        &self.registry
    }

    /// The configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one logical call and returns the validated envelope.
    ///
    /// GET calls are attempted up to the policy's budget with linear backoff
    /// between attempts; other methods are attempted once. An empty 2xx body
    /// yields [`ApiEnvelope::empty_success`].
    ///
    /// # Errors
    ///
    /// Returns the last attempt's [`ApiError`], or a cancellation error if
    /// the call's handle was cancelled.
    pub async fn perform(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiEnvelope<Value>, ApiError> {
        let policy = self.policy.for_method(&options.method);
        let request = self.build_request(path, options)?;
        let guard = SettleOnDrop(self.registry.create());
        let handle = &guard.0;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            handle = %handle.id(),
            "request started"
        );

        let request = &request;
        let outcome = tokio::select! {
            biased;
            () = handle.cancelled() => Err(ApiError::cancelled(&request.url)),
            result = policy.run(
                |attempt| self.attempt(request, attempt),
                |error| policy.should_retry(error),
            ) => result,
        };
        drop(guard);

        match &outcome {
            Ok(_) => tracing::debug!(url = %request.url, "request succeeded"),
            Err(error) if error.is_cancelled() => {
                tracing::debug!(url = %request.url, "request cancelled");
            }
            Err(error) => tracing::error!(
                url = %error.url,
                status = error.status,
                kind = ?error.kind,
                message = %error.message,
                "request failed"
            ),
        }
        outcome
    }

    /// Performs one logical call and decodes the envelope's `data` into `D`.
    ///
    /// # Errors
    ///
    /// Everything [`perform`](Self::perform) returns, plus an
    /// [`ApiErrorKind::Envelope`](super::ApiErrorKind::Envelope) error when the
    /// payload does not have the expected shape.
    pub async fn perform_data<D: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<D, ApiError> {
        let envelope = self.perform(path, options).await?;
        serde_json::from_value(envelope.data).map_err(|error| {
            ApiError::envelope(
                SUCCESS_STATUS,
                format!("Unexpected response payload: {error}"),
                format!("{}{path}", self.base_url),
            )
        })
    }

    async fn attempt(&self, request: &HttpRequest, attempt: usize) -> Result<ApiEnvelope, ApiError> {
        tracing::trace!(attempt, url = %request.url, "sending attempt");

        let exchange = self.transport.send(request.clone());
        let response = match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| ApiError::timeout(&request.url, limit))?,
            None => exchange.await,
        }
        .map_err(|error| ApiError::transport(&request.url, &error))?;

        parse_response(&response, &request.url)
    }

    fn build_request(&self, path: &str, options: RequestOptions) -> Result<HttpRequest, ApiError> {
        let raw = format!("{}{path}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|error| {
            ApiError::transport(
                raw.as_str(),
                &TransportError::Request(format!("invalid URL: {error}")),
            )
        })?;
        if !options.segments.is_empty() {
            url.path_segments_mut()
                .map_err(|()| {
                    ApiError::transport(
                        raw.as_str(),
                        &TransportError::Request("URL cannot carry path segments".to_string()),
                    )
                })?
                .pop_if_empty()
                .extend(&options.segments);
        }
        if !options.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&options.query);
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        for (name, value) in options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        Ok(HttpRequest {
            method: options.method,
            url: url.into(),
            headers,
            body: options.body,
        })
    }
}

/// Completes the call's handle however `perform` ends, including when the
/// caller drops the future part-way. A no-op once the handle has settled.
struct SettleOnDrop(CancellationHandle);

impl Drop for SettleOnDrop {
    fn drop(&mut self) {
        self.0.complete();
    }
}

impl<T> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("policy", &self.policy)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Turns one raw response into an envelope or an [`ApiError`].
///
/// Checks run in order: JSON syntax, HTTP status, envelope success flag.
///
/// # Errors
///
/// - `MalformedResponse` when the body is not JSON
/// - `Http` for a non-2xx status, with the backend message when present
/// - `Envelope` for a 2xx response whose envelope is not successful
pub fn parse_response(response: &RawResponse, url: &str) -> Result<ApiEnvelope, ApiError> {
    let status = response.status;

    if response.body.trim().is_empty() {
        return if response.is_success() {
            Ok(ApiEnvelope::empty_success())
        } else {
            Err(ApiError::http(status, FALLBACK_MESSAGE, url))
        };
    }

    let value: Value = serde_json::from_str(&response.body)
        .map_err(|_| ApiError::malformed(status, &response.body, url))?;

    let Ok(envelope) = serde_json::from_value::<ApiEnvelope>(value) else {
        return Err(if response.is_success() {
            ApiError::envelope(status, FALLBACK_MESSAGE, url)
        } else {
            ApiError::http(status, FALLBACK_MESSAGE, url)
        });
    };

    if !response.is_success() {
        return Err(
            ApiError::http(status, envelope.message_or(FALLBACK_MESSAGE), url)
                .with_errors(envelope.error_list().to_vec()),
        );
    }

    if !envelope.is_success {
        return Err(
            ApiError::envelope(status, envelope.message_or(FALLBACK_MESSAGE), url)
                .with_errors(envelope.error_list().to_vec()),
        );
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiErrorKind;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    const URL: &str = "http://localhost:5000/api/users/alice";

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, body)
    }

    #[rstest]
    fn test_parse_success_keeps_payload() {
        let body = json!({
            "is_success": true,
            "message": "OK",
            "data": { "id": "1", "username": "alice" },
        });
        let envelope = parse_response(&response(200, &body.to_string()), URL).unwrap();
        assert_eq!(envelope.data, json!({ "id": "1", "username": "alice" }));
    }

    #[rstest]
    #[case(200, "")]
    #[case(204, "")]
    #[case(200, "   \n")]
    fn test_parse_empty_body_synthesizes_success(#[case] status: u16, #[case] body: &str) {
        let envelope = parse_response(&response(status, body), URL).unwrap();
        assert_eq!(envelope, ApiEnvelope::empty_success());
    }

    #[rstest]
    fn test_parse_empty_error_body_uses_fallback() {
        let error = parse_response(&response(500, ""), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Http);
        assert_eq!(error.message, FALLBACK_MESSAGE);
    }

    #[rstest]
    #[case(200)]
    #[case(502)]
    fn test_parse_malformed_json(#[case] status: u16) {
        let error = parse_response(&response(status, "<html>oops</html>"), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::MalformedResponse);
        assert_eq!(error.status, status);
        assert!(error.message.contains("<html>oops</html>"));
        assert_eq!(error.url, URL);
    }

    #[rstest]
    fn test_parse_http_error_uses_backend_message() {
        let body = json!({ "is_success": false, "message": "name is required" });
        let error = parse_response(&response(422, &body.to_string()), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Http);
        assert_eq!(error.status, 422);
        assert_eq!(error.message, "name is required");
    }

    #[rstest]
    fn test_parse_http_error_without_message() {
        let error = parse_response(&response(404, r#"{"detail":"missing"}"#), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Http);
        assert_eq!(error.message, FALLBACK_MESSAGE);
    }

    #[rstest]
    fn test_parse_null_message_success() {
        let body = json!({ "is_success": true, "message": null, "data": { "id": "1" } });
        let envelope = parse_response(&response(200, &body.to_string()), URL).unwrap();
        assert_eq!(envelope.data, json!({ "id": "1" }));
        assert!(envelope.message.is_empty());
    }

    #[rstest]
    fn test_parse_null_message_failure_uses_fallback() {
        let body = json!({ "is_success": false, "message": null });
        let error = parse_response(&response(500, &body.to_string()), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Http);
        assert_eq!(error.message, FALLBACK_MESSAGE);
    }

    #[rstest]
    fn test_parse_envelope_failure_on_2xx() {
        let body = json!({
            "is_success": false,
            "message": "User not found",
            "data": { "id": "ignored" },
            "errors": ["no such user"],
        });
        let error = parse_response(&response(200, &body.to_string()), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Envelope);
        assert_eq!(error.message, "User not found");
        assert_eq!(error.errors, vec!["no such user".to_string()]);
    }

    #[rstest]
    #[case("[1, 2, 3]")]
    #[case("\"text\"")]
    #[case("42")]
    fn test_parse_non_object_json_is_envelope_failure(#[case] body: &str) {
        let error = parse_response(&response(200, body), URL).unwrap_err();
        assert_eq!(error.kind, ApiErrorKind::Envelope);
        assert_eq!(error.message, FALLBACK_MESSAGE);
    }

    #[rstest]
    fn test_request_options_builders() {
        let options = RequestOptions::post("{}")
            .with_header("X-Trace", "1")
            .with_query("username", "alice");
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.as_deref(), Some("{}"));
        assert_eq!(options.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(options.query, vec![("username".to_string(), "alice".to_string())]);
        assert!(options.segments.is_empty());
        assert_eq!(RequestOptions::default().method, Method::GET);
    }

    proptest! {
        #[test]
        fn prop_successful_payload_round_trips(text in ".*", number in any::<i64>(), flag in any::<bool>()) {
            let payload = json!({ "text": text, "number": number, "flag": flag });
            let body = json!({ "is_success": true, "message": "OK", "data": payload.clone() });
            let envelope = parse_response(&response(200, &body.to_string()), URL).unwrap();
            prop_assert_eq!(envelope.data, payload);
        }

        #[test]
        fn prop_non_2xx_never_succeeds(status in 300u16..600) {
            let body = json!({ "is_success": true, "message": "looks fine", "data": null });
            let result = parse_response(&response(status, &body.to_string()), URL);
            prop_assert!(result.is_err());
        }
    }
}
