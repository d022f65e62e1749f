use serde::{Deserialize, Serialize};
use std::fmt;

/// Which remote engine family serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelEngineType {
    LlamaRemote,
    ClaudeRemote,
}

impl fmt::Display for ModelEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LlamaRemote => write!(f, "llama"),
            Self::ClaudeRemote => write!(f, "claude"),
        }
    }
}

/// A selectable chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Stable key used in config and on the command line.
    pub key: String,
    /// Model name sent to the remote API.
    pub name: String,
    pub display_maker: String,
    pub display_name: String,
    pub engine_type: ModelEngineType,
    pub is_premium: bool,
}
