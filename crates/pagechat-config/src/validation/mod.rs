//! Full configuration validation.
//!
//! Validates numeric ranges, the model key format and engine URLs.
//! Each section has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod engine;
mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::PageChatConfig;
use pagechat_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PageChatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    engine::validate_model_key(&mut errors, config);
    engine::validate_urls(&mut errors, config);
    engine::validate_limits(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
