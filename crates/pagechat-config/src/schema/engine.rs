//! Engine configuration types.

use serde::{Deserialize, Serialize};

/// Remote engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key of the model used for new conversations.
    pub model_key: String,
    /// Anthropic messages endpoint.
    pub claude_api_url: String,
    /// llama.cpp-compatible `/completion` endpoint.
    pub llama_api_url: String,
    /// Connect timeout in seconds (valid range: 1-60).
    pub connect_timeout_secs: u32,
    /// Whole-request timeout in seconds (valid range: 5-600).
    pub request_timeout_secs: u32,
    /// Maximum tokens to generate per response (valid range: 64-8192).
    pub max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_key: "chat-default".into(),
            claude_api_url: "https://api.anthropic.com/v1/messages".into(),
            llama_api_url: "http://127.0.0.1:8080/completion".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
            max_tokens: 800,
        }
    }
}
