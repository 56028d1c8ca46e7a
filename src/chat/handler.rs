//! `POST /api/chat`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::knowledge::system_prompt;
use super::language::detect_language;
use super::provider::{
    ChatError, ChatMessage, ChatRole, CompletionProvider, CompletionRequest, OpenAiProvider, Usage,
};
use crate::config::ChatConfig;
use crate::domain::Language;

/// Answer used when the provider returns no text.
pub const EMPTY_ANSWER: &str = "Sorry, I could not generate a response.";

// =============================================================================
// State
// =============================================================================

/// Shared state of the chat router.
#[derive(Clone)]
pub struct ChatState {
    provider: Option<Arc<dyn CompletionProvider>>,
    config: Arc<ChatConfig>,
}

impl ChatState {
    /// State backed by the OpenAI-compatible provider, if a key is configured.
    #[must_use]
    pub fn from_config(config: ChatConfig) -> Self {
        let provider = OpenAiProvider::from_config(&config)
            .map(|provider| Arc::new(provider) as Arc<dyn CompletionProvider>);
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    /// State with an explicit provider; `None` behaves like a missing key.
    #[must_use]
    pub fn with_provider(config: ChatConfig, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }
}

impl std::fmt::Debug for ChatState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ChatState")
            .field("configured", &self.provider.is_some())
            .field("config", &self.config)
            .finish()
    }
}

// =============================================================================
// DTOs
// =============================================================================

/// Request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    #[serde(default)]
    pub message: Option<String>,
    /// Earlier turns of the conversation.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// Answer language code; detected from the message when absent or
    /// not one of `en`, `uz`, `ru`.
    #[serde(default)]
    pub language: Option<String>,
}

/// One earlier turn.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    /// `user` or `assistant`; anything else is sent as `user`.
    pub role: String,
    /// Text.
    pub content: String,
}

impl HistoryEntry {
    fn to_message(&self) -> ChatMessage {
        let role = if self.role.eq_ignore_ascii_case("assistant") {
            ChatRole::Assistant
        } else {
            ChatRole::User
        };
        ChatMessage::new(role, self.content.clone())
    }
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    /// The assistant's answer.
    pub answer: String,
    /// Token accounting, if reported.
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

// =============================================================================
// Errors
// =============================================================================

/// Failure of a chat request.
#[derive(Debug)]
pub enum ChatFailure {
    /// The message is missing or blank.
    MissingMessage,
    /// No provider key is configured.
    NotConfigured,
    /// The body is not a JSON chat request.
    InvalidBody(JsonRejection),
    /// The provider call failed.
    Provider(ChatError),
}

impl ChatFailure {
    const fn status(&self) -> StatusCode {
        match self {
            Self::MissingMessage => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::InvalidBody(_) | Self::Provider(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    const fn message(&self) -> &'static str {
        match self {
            Self::MissingMessage => "Message is required",
            Self::NotConfigured => "OpenAI API key not configured",
            Self::InvalidBody(_) | Self::Provider(_) => "Failed to process chat request",
        }
    }
}

impl IntoResponse for ChatFailure {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Builds the provider request for a validated chat request.
#[must_use]
pub fn build_completion_request(
    config: &ChatConfig,
    message: &str,
    history: &[HistoryEntry],
    language: Language,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new(ChatRole::System, system_prompt(language)));
    messages.extend(history.iter().map(HistoryEntry::to_message));
    messages.push(ChatMessage::new(ChatRole::User, message));

    CompletionRequest {
        model: config.model.clone(),
        messages,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Answers one chat message.
///
/// # Errors
///
/// - 400 `Message is required` for a missing or blank message
/// - 500 `OpenAI API key not configured` without a provider
/// - 500 `Failed to process chat request` for an unreadable body or when
///   the provider fails
pub async fn chat(
    State(state): State<ChatState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatFailure> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::error!(error = %rejection, "Chat API error");
        ChatFailure::InvalidBody(rejection)
    })?;
    let message = request
        .message
        .filter(|message| !message.trim().is_empty())
        .ok_or(ChatFailure::MissingMessage)?;
    let provider = state.provider.as_ref().ok_or(ChatFailure::NotConfigured)?;

    let language = request
        .language
        .as_deref()
        .and_then(|code| code.parse::<Language>().ok())
        .unwrap_or_else(|| detect_language(&message));
    let completion_request =
        build_completion_request(&state.config, &message, &request.history, language);

    tracing::debug!(%language, history = request.history.len(), "chat request");

    let completion = provider
        .complete(completion_request)
        .await
        .map_err(|error| {
            tracing::error!(%error, "Chat API error");
            ChatFailure::Provider(error)
        })?;

    let answer = completion
        .content
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_ANSWER.to_string());

    Ok(Json(ChatReply {
        answer,
        usage: completion.usage,
    }))
}

/// The chat router: `POST /api/chat` and `GET /health`.
pub fn router(state: ChatState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", axum::routing::get(health))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}
