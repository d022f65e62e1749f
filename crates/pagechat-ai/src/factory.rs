//! Engine construction keyed by model.

use std::sync::Arc;
use std::time::Duration;

use pagechat_common::{Model, ModelEngineType};
use tracing::info;

use crate::claude::{ClaudeCredentials, ClaudeRemote};
use crate::llama::LlamaRemote;
use crate::{AiError, EngineConsumer};

/// Endpoint and limit settings shared by the remote engines.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub claude_api_url: String,
    pub llama_api_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_tokens: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            claude_api_url: "https://api.anthropic.com/v1/messages".into(),
            llama_api_url: "http://127.0.0.1:8080/completion".into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_tokens: 800,
        }
    }
}

/// Builds the engine that serves a model.
pub trait EngineFactory: Send + Sync {
    fn create(&self, model: &Model) -> Result<Arc<dyn EngineConsumer>, AiError>;
}

/// Factory for the built-in remote engines.
pub struct RemoteEngineFactory {
    settings: EngineSettings,
}

impl RemoteEngineFactory {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl EngineFactory for RemoteEngineFactory {
    fn create(&self, model: &Model) -> Result<Arc<dyn EngineConsumer>, AiError> {
        info!(model = %model.key, engine = %model.engine_type, "Started AI engine");
        let engine: Arc<dyn EngineConsumer> = match model.engine_type {
            ModelEngineType::LlamaRemote => {
                Arc::new(LlamaRemote::new(model.clone(), &self.settings)?)
            }
            ModelEngineType::ClaudeRemote => Arc::new(ClaudeRemote::new(
                model.clone(),
                ClaudeCredentials::from_env()?,
                &self.settings,
            )?),
        };
        Ok(engine)
    }
}
