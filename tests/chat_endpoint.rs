//! Integration tests for `POST /api/chat`.
//!
//! The router is driven through `tower::ServiceExt::oneshot` with a stub
//! completion provider, so no network access is needed.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use moliyachi_client::chat::{
    ChatError, ChatRole, ChatState, Completion, CompletionProvider, CompletionRequest,
    EMPTY_ANSWER, Usage, router,
};
use moliyachi_client::config::ChatConfig;

// =============================================================================
// Stub Provider
// =============================================================================

struct StubProvider {
    reply: Result<Completion, ChatError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubProvider {
    fn answering(content: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Completion {
                content: content.map(str::to_string),
                usage: Some(Usage {
                    prompt_tokens: 120,
                    completion_tokens: 30,
                    total_tokens: 150,
                }),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: ChatError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> CompletionRequest {
        self.requests.lock().last().cloned().unwrap()
    }
}

impl CompletionProvider for StubProvider {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<Completion, ChatError>> {
        self.requests.lock().push(request);
        let reply = self.reply.clone();
        Box::pin(async move { reply })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app(provider: Option<Arc<StubProvider>>) -> Router {
    let provider = provider.map(|provider| provider as Arc<dyn CompletionProvider>);
    router(ChatState::with_provider(ChatConfig::default(), provider))
}

async fn post_chat(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =============================================================================
// Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_answer_with_usage() {
    let provider = StubProvider::answering(Some("Moliyachi is a finance assistant."));

    let (status, body) = post_chat(
        app(Some(Arc::clone(&provider))),
        &json!({ "message": "Who is it for?" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "answer": "Moliyachi is a finance assistant.",
            "usage": { "prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150 }
        })
    );
}

#[rstest]
#[case(json!({}))]
#[case(json!({ "message": "" }))]
#[case(json!({ "message": "   " }))]
#[tokio::test]
async fn test_missing_message(#[case] payload: Value) {
    let provider = StubProvider::answering(Some("unused"));

    let (status, body) = post_chat(app(Some(Arc::clone(&provider))), &payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Message is required" }));
    assert!(provider.requests.lock().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_without_provider() {
    let (status, body) = post_chat(app(None), &json!({ "message": "Hi" }).to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "OpenAI API key not configured" }));
}

#[rstest]
#[tokio::test]
async fn test_provider_failure() {
    let provider = StubProvider::failing(ChatError::Status {
        status: 429,
        body: "rate limited".to_string(),
    });

    let (status, body) = post_chat(
        app(Some(provider)),
        &json!({ "message": "Hi" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to process chat request" }));
}

#[rstest]
#[tokio::test]
async fn test_unreadable_body() {
    let provider = StubProvider::answering(Some("unused"));

    let (status, body) = post_chat(app(Some(provider)), "{ not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to process chat request" }));
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[tokio::test]
async fn test_empty_completion_uses_fallback(#[case] content: Option<&str>) {
    let provider = StubProvider::answering(content);

    let (status, body) = post_chat(
        app(Some(provider)),
        &json!({ "message": "Hi" }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], json!(EMPTY_ANSWER));
}

#[rstest]
#[case("Что такое Moliyachi?", None, "PROBLEM - Проблема:")]
#[case("Moliyachi nima?", None, "PROBLEM - Muammo:")]
#[case("Who is it for?", None, "PROBLEM - The Problem:")]
#[case("Who is it for?", Some("ru"), "PROBLEM - Проблема:")]
#[case("Что это?", Some("klingon"), "PROBLEM - Проблема:")]
#[tokio::test]
async fn test_prompt_language(
    #[case] message: &str,
    #[case] language: Option<&str>,
    #[case] heading: &str,
) {
    let provider = StubProvider::answering(Some("ok"));

    let (status, _) = post_chat(
        app(Some(Arc::clone(&provider))),
        &json!({ "message": message, "language": language }).to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let request = provider.last_request();
    assert_eq!(request.messages[0].role, ChatRole::System);
    assert!(request.messages[0].content.contains(heading));
}

#[rstest]
#[tokio::test]
async fn test_history_is_forwarded() {
    let provider = StubProvider::answering(Some("ok"));

    post_chat(
        app(Some(Arc::clone(&provider))),
        &json!({
            "message": "And the price?",
            "history": [
                { "role": "user", "content": "What is Moliyachi?" },
                { "role": "assistant", "content": "A finance assistant." }
            ]
        })
        .to_string(),
    )
    .await;

    let request = provider.last_request();
    let turns: Vec<(ChatRole, &str)> = request
        .messages
        .iter()
        .skip(1)
        .map(|message| (message.role, message.content.as_str()))
        .collect();
    assert_eq!(
        turns,
        vec![
            (ChatRole::User, "What is Moliyachi?"),
            (ChatRole::Assistant, "A finance assistant."),
            (ChatRole::User, "And the price?"),
        ]
    );
    assert_eq!(request.model, ChatConfig::default().model);
}

#[rstest]
#[tokio::test]
async fn test_health() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app(None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
