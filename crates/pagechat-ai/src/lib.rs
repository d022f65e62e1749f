//! Engine adapters for pagechat.
//!
//! Provides the [`EngineConsumer`] contract the chat driver talks to, and
//! two remote implementations:
//! - Claude via the Anthropic Messages API
//! - Llama 2 chat models via a llama.cpp-compatible `/completion` server
//!
//! Both stream responses over SSE. Engines are built from a [`Model`] by an
//! [`EngineFactory`], so new engine families can be added without touching
//! the driver.

pub mod claude;
pub mod factory;
pub mod http;
pub mod llama;
pub mod models;
pub mod prompts;
pub mod streaming;

use async_trait::async_trait;
use pagechat_common::{ApiError, ConversationTurn};

pub use claude::{ClaudeCredentials, ClaudeRemote};
pub use factory::{EngineFactory, EngineSettings, RemoteEngineFactory};
pub use llama::LlamaRemote;
pub use models::{all_models, model_by_key, DEFAULT_MODEL_KEY};

/// Receives the cumulative response text each time more of it arrives.
pub type ChunkCallback = Box<dyn Fn(String) + Send + Sync>;

/// A remote model the driver can ask questions of.
#[async_trait]
pub trait EngineConsumer: Send + Sync {
    /// Strip substrings that would break this engine's prompt format.
    fn sanitize_input(&self, text: &mut String);

    /// Ask for short follow-up questions about the page.
    async fn generate_question_suggestions(
        &self,
        is_video: bool,
        page_content: &str,
    ) -> Result<Vec<String>, AiError>;

    /// Stream an answer to `human_input`.
    ///
    /// `on_chunk` receives the whole answer so far, not a delta. The
    /// returned string is the complete answer.
    async fn generate_assistant_response(
        &self,
        is_video: bool,
        page_content: &str,
        history: &[ConversationTurn],
        human_input: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError>;

    /// Abort every request this engine has in flight.
    fn clear_all_queries(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
    #[error("Not configured: {0}")]
    NotConfigured(String),
    #[error("Cancelled")]
    Cancelled,
}

impl AiError {
    /// The error to show the user, or `None` when the request was
    /// deliberately cancelled and nothing should be reported.
    pub fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Cancelled => None,
            Self::RateLimited => Some(ApiError::RateLimitReached),
            Self::NetworkError(_) | Self::Timeout => Some(ApiError::ConnectionIssue),
            Self::ApiError(_) | Self::ParseError(_) | Self::NotConfigured(_) => {
                Some(ApiError::InternalError)
            }
        }
    }
}
