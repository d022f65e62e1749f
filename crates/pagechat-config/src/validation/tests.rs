//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    let config = PageChatConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_empty_model_key() {
    let mut config = PageChatConfig::default();
    config.engine.model_key = String::new();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.model_key is empty"));
}

#[test]
fn catches_malformed_model_key() {
    let mut config = PageChatConfig::default();
    config.engine.model_key = "Chat Default".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.model_key"));
}

#[test]
fn catches_non_http_url() {
    let mut config = PageChatConfig::default();
    config.engine.llama_api_url = "ftp://example.com/completion".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.llama_api_url"));
    assert!(err.contains("ftp"));
}

#[test]
fn catches_unparseable_url() {
    let mut config = PageChatConfig::default();
    config.engine.claude_api_url = "not a url".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.claude_api_url"));
}

#[test]
fn catches_timeouts_out_of_range() {
    let mut config = PageChatConfig::default();
    config.engine.connect_timeout_secs = 0;
    config.engine.request_timeout_secs = 1000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.connect_timeout_secs"));
    assert!(err.contains("engine.request_timeout_secs"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = PageChatConfig::default();
    config.engine.max_tokens = 10;
    config.engine.model_key = String::new();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("engine.max_tokens"));
    assert!(err.contains("engine.model_key"));
    assert!(err.contains("; "));
}
