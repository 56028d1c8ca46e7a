//! Common test utilities for integration tests.
//!
//! Each integration test file compiles as its own crate and uses a different
//! subset of these helpers, so unused-item warnings are silenced here.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use moliyachi_client::http::{
    ApiClient, HttpRequest, RawResponse, RetryPolicy, Transport, TransportError,
};
use moliyachi_client::request::RequestRegistry;
use moliyachi_client::service::FinanceApi;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::Instant;

pub const BASE_URL: &str = "http://api.test";

// =============================================================================
// Scripted Transport
// =============================================================================

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Mutex<Option<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    instants: Mutex<Vec<Instant>>,
    calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

/// Transport that replays queued responses and records every request.
///
/// When the queue runs dry the fallback response is returned; without a
/// fallback the transport fails with a connection error.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Script>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport answering every call with `response`.
    pub fn always(response: RawResponse) -> Self {
        let transport = Self::new();
        *transport.script.fallback.lock() = Some(Ok(response));
        transport
    }

    pub fn push(&self, response: RawResponse) -> &Self {
        self.script.responses.lock().push_back(Ok(response));
        self
    }

    pub fn push_error(&self, error: TransportError) -> &Self {
        self.script.responses.lock().push_back(Err(error));
        self
    }

    /// Makes every call wait `delay` before answering.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.script.delay.lock() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.script.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.script.requests.lock().last().cloned()
    }

    /// Instants at which each call started, in call order.
    pub fn instants(&self) -> Vec<Instant> {
        self.script.instants.lock().clone()
    }

    fn next_response(&self) -> Result<RawResponse, TransportError> {
        if let Some(response) = self.script.responses.lock().pop_front() {
            return response;
        }
        self.script
            .fallback
            .lock()
            .clone()
            .unwrap_or_else(|| Err(TransportError::Connect("connection refused".to_string())))
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        self.script.instants.lock().push(Instant::now());
        self.script.requests.lock().push(request);

        let delay = *self.script.delay.lock();
        let response = self.next_response();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }
}

// =============================================================================
// Response Builders
// =============================================================================

pub fn envelope(data: Value) -> String {
    json!({ "is_success": true, "message": "OK", "data": data }).to_string()
}

pub fn failure_envelope(message: &str) -> String {
    json!({ "is_success": false, "message": message, "data": null }).to_string()
}

pub fn ok(data: Value) -> RawResponse {
    RawResponse::new(200, envelope(data))
}

pub fn server_error(message: &str) -> RawResponse {
    RawResponse::new(500, failure_envelope(message))
}

// =============================================================================
// Client Construction
// =============================================================================

pub fn registry() -> Arc<RequestRegistry> {
    Arc::new(RequestRegistry::new())
}

pub fn client(
    transport: &ScriptedTransport,
    registry: &Arc<RequestRegistry>,
) -> ApiClient<ScriptedTransport> {
    ApiClient::new(transport.clone(), BASE_URL, Arc::clone(registry))
}

pub fn client_with_policy(
    transport: &ScriptedTransport,
    registry: &Arc<RequestRegistry>,
    policy: RetryPolicy,
) -> ApiClient<ScriptedTransport> {
    client(transport, registry).with_retry_policy(policy)
}

pub fn finance_api(
    transport: &ScriptedTransport,
    registry: &Arc<RequestRegistry>,
) -> FinanceApi<ScriptedTransport> {
    FinanceApi::new(client(transport, registry), "johndoe")
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn user_json(email: &str) -> Value {
    json!({
        "id": "u-1",
        "username": "johndoe",
        "email": email,
        "phone_number": "+998901234567",
        "first_name": "John",
        "last_name": "Doe",
        "salary": 8_000_000.0,
        "currency": "UZS",
        "age": 30,
        "family_size": 3,
        "bio": null,
        "location": "Tashkent",
        "role": "Client",
        "cards": [],
        "is_active": true,
        "created_at": "2025-01-01T00:00:00",
        "updated_at": "2025-01-01T00:00:00"
    })
}

pub fn goal_json(id: &str) -> Value {
    json!({
        "id": id,
        "user_id": "u-1",
        "name": "New laptop",
        "target_amount": 12_000_000.0,
        "current_amount": 3_000_000.0,
        "currency": "UZS",
        "status": "Active",
        "priority": "Medium",
        "target_date": "2025-12-31",
        "description": null,
        "created_at": "2025-01-01T00:00:00"
    })
}
