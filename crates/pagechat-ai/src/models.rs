//! Static model registry.

use std::sync::OnceLock;

use pagechat_common::{Model, ModelEngineType};

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL_KEY: &str = "chat-default";

/// Every selectable model, default first.
pub fn all_models() -> &'static [Model] {
    static MODELS: OnceLock<Vec<Model>> = OnceLock::new();
    MODELS.get_or_init(|| {
        vec![
            Model {
                key: DEFAULT_MODEL_KEY.into(),
                name: "llama-2-13b-chat".into(),
                display_maker: "Meta".into(),
                display_name: "llama2 13b".into(),
                engine_type: ModelEngineType::LlamaRemote,
                is_premium: false,
            },
            Model {
                key: "chat-leo-expanded".into(),
                name: "llama-2-70b-chat".into(),
                display_maker: "Meta".into(),
                display_name: "llama2 70b".into(),
                engine_type: ModelEngineType::LlamaRemote,
                is_premium: true,
            },
            Model {
                key: "chat-claude-instant".into(),
                name: "claude-instant-v1".into(),
                display_maker: "Anthropic".into(),
                display_name: "Claude Instant".into(),
                engine_type: ModelEngineType::ClaudeRemote,
                is_premium: false,
            },
        ]
    })
}

pub fn model_by_key(key: &str) -> Option<&'static Model> {
    all_models().iter().find(|m| m.key == key)
}
