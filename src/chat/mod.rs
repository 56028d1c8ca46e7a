//! The landing site's chat assistant.
//!
//! `POST /api/chat` answers questions about the product from a static,
//! multilingual knowledge base through an OpenAI-compatible completion API.
//! The provider sits behind [`CompletionProvider`] so the router can be
//! exercised without network access.

mod handler;
mod knowledge;
mod language;
mod provider;

pub use handler::{
    ChatFailure, ChatReply, ChatRequest, ChatState, EMPTY_ANSWER, HistoryEntry,
    build_completion_request, chat, router,
};
pub use knowledge::{KnowledgeBase, LINKS, PROJECT_NAME, system_prompt};
pub use language::detect_language;
pub use provider::{
    ChatError, ChatMessage, ChatRole, Completion, CompletionProvider, CompletionRequest,
    OpenAiProvider, Usage,
};
