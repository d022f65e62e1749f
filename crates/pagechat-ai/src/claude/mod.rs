//! Anthropic Claude engine.
//!
//! Implements [`EngineConsumer`](crate::EngineConsumer) for Claude models via
//! the Anthropic Messages API. Page content travels in the system prompt;
//! history maps onto alternating user/assistant messages.

mod api;
mod client;
mod config;

pub use client::ClaudeRemote;
pub use config::{AuthMethod, ClaudeCredentials};
