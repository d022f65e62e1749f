//! Validation for the `[engine]` section.

use std::sync::OnceLock;

use regex::Regex;

use crate::schema::PageChatConfig;

use super::helpers::{validate_http_url, validate_range};

fn model_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").expect("valid model key regex"))
}

/// Model keys are lowercase slugs such as `chat-claude-instant`.
pub(crate) fn validate_model_key(errors: &mut Vec<String>, config: &PageChatConfig) {
    let key = &config.engine.model_key;
    if key.is_empty() {
        errors.push("engine.model_key is empty".into());
    } else if !model_key_pattern().is_match(key) {
        errors.push(format!(
            "engine.model_key = {key:?} must be lowercase letters, digits and dashes"
        ));
    }
}

pub(crate) fn validate_urls(errors: &mut Vec<String>, config: &PageChatConfig) {
    validate_http_url(errors, "engine.claude_api_url", &config.engine.claude_api_url);
    validate_http_url(errors, "engine.llama_api_url", &config.engine.llama_api_url);
}

pub(crate) fn validate_limits(errors: &mut Vec<String>, config: &PageChatConfig) {
    validate_range(
        errors,
        "engine.connect_timeout_secs",
        config.engine.connect_timeout_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "engine.request_timeout_secs",
        config.engine.request_timeout_secs,
        5,
        600,
    );
    validate_range(errors, "engine.max_tokens", config.engine.max_tokens, 64, 8192);
}
