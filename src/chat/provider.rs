//! Completion providers.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instructions for the model.
    System,
    /// The person chatting.
    User,
    /// The model.
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author.
    pub role: ChatRole,
    /// Text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Sum of both.
    pub total_tokens: u32,
}

/// A completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model name.
    pub model: String,
    /// Conversation, system prompt first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// A completion result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Text of the first choice, if the provider produced one.
    pub content: Option<String>,
    /// Token accounting, if reported.
    pub usage: Option<Usage>,
}

/// Failure talking to a completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The request never produced a response.
    #[error("Provider request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-2xx status.
    #[error("Provider returned status {status}: {body}")]
    Status {
        /// HTTP status.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response could not be decoded.
    #[error("Invalid provider response: {0}")]
    Decode(String),
}

/// Produces chat completions.
pub trait CompletionProvider: Send + Sync {
    /// Completes `request`.
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<Completion, ChatError>>;
}

// =============================================================================
// OpenAI-compatible Provider
// =============================================================================

/// Calls `POST {base_url}/chat/completions` of an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// Creates a provider.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a provider from configuration, or `None` when no key is set.
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .map(|key| Self::new(config.api_base_url.clone(), key))
    }

    async fn request(&self, request: CompletionRequest) -> Result<Completion, ChatError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| ChatError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| ChatError::Transport(error.to_string()))?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CompletionProvider for OpenAiProvider {
    fn complete(&self, request: CompletionRequest) -> BoxFuture<'_, Result<Completion, ChatError>> {
        Box::pin(self.request(request))
    }
}

#[derive(Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: Option<WireMessage>,
}

#[derive(Deserialize)]
struct WireMessage {
    content: Option<String>,
}

/// Decodes a `/chat/completions` response body.
fn parse_completion(body: &str) -> Result<Completion, ChatError> {
    let wire: WireResponse =
        serde_json::from_str(body).map_err(|error| ChatError::Decode(error.to_string()))?;
    let content = wire
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content);
    Ok(Completion {
        content,
        usage: wire.usage,
    })
}
