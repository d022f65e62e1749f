//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# pagechat Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[chat]
# Set to true once you accept that page content is sent to the model.
has_seen_disclaimer = false
# Leave unset to be asked; true/false to decide for good.
# auto_generate_questions = true

[engine]
# model_key = "chat-default"   # chat-default, chat-leo-expanded, chat-claude-instant
# claude_api_url = "https://api.anthropic.com/v1/messages"
# llama_api_url = "http://127.0.0.1:8080/completion"
# connect_timeout_secs = 10    # 1-60
# request_timeout_secs = 120   # 5-600
# max_tokens = 800             # 64-8192

[logging]
# level = "INFO"               # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
