//! Reading the TOML config file.

use crate::schema::PageChatConfig;
use crate::validation;
use pagechat_common::ConfigError;
use std::path::Path;
use tracing::{info, warn};

/// Parse the config at `path`, filling missing fields with defaults.
///
/// Out-of-range values are logged and kept; callers that must not accept
/// them run [`validate`](crate::validation::validate) themselves.
pub fn load_from_path(path: &Path) -> Result<PageChatConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: PageChatConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning: {e}, using parsed config with potentially invalid values");
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `path`, falling back to defaults when the file is missing.
pub fn load_or_default(path: &Path) -> Result<PageChatConfig, ConfigError> {
    match load_from_path(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => Ok(PageChatConfig::default()),
        Err(e) => Err(e),
    }
}
