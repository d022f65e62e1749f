//! Claude API credentials.

use std::fmt;

use crate::AiError;

/// How the client authenticates with the Claude API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Anthropic API key (`x-api-key` header).
    ApiKey,
    /// Bearer token (`Authorization: Bearer`).
    OAuth,
}

#[derive(Clone)]
pub struct ClaudeCredentials {
    pub token: String,
    pub auth_method: AuthMethod,
}

impl fmt::Debug for ClaudeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaudeCredentials")
            .field("auth_method", &self.auth_method)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ClaudeCredentials {
    pub fn new(token: impl Into<String>, auth_method: AuthMethod) -> Self {
        Self {
            token: token.into(),
            auth_method,
        }
    }

    /// Resolve credentials from the environment.
    ///
    /// Resolution order:
    /// 1. `ANTHROPIC_API_KEY` (API key auth)
    /// 2. `ANTHROPIC_AUTH_TOKEN` (bearer auth)
    pub fn from_env() -> Result<Self, AiError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    pub(crate) fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AiError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
            return Ok(Self::new(key, AuthMethod::ApiKey));
        }
        if let Some(token) = non_empty("ANTHROPIC_AUTH_TOKEN") {
            return Ok(Self::new(token, AuthMethod::OAuth));
        }

        Err(AiError::NotConfigured(
            "Claude API not configured. Set ANTHROPIC_API_KEY or ANTHROPIC_AUTH_TOKEN.".into(),
        ))
    }
}
