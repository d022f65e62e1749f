//! Writing config back to disk.
//!
//! Every write goes to a `.tmp` sibling first and is renamed into place, so
//! the reload watcher never sees a half-written file.

use std::path::Path;

use pagechat_common::ConfigError;
use tracing::{debug, warn};

use crate::schema::{ChatPrefs, PageChatConfig};
use crate::toml_loader::load_or_default;

/// Serialize `config` to `path`, creating parent directories as needed.
pub fn save_config_to_path(config: &PageChatConfig, path: &Path) -> Result<(), ConfigError> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ConfigError::ParseError(format!("failed to serialize config to TOML: {e}")))?;
    write_atomic(path, &toml_str)?;
    debug!(path = %path.display(), "config saved");
    Ok(())
}

/// Replace the `[chat]` section of the config at `path`, keeping the other
/// sections as they are on disk. Nothing is written when the section
/// already matches.
pub fn save_chat_prefs(prefs: &ChatPrefs, path: &Path) -> Result<(), ConfigError> {
    let mut config = load_or_default(path)?;
    if config.chat == *prefs {
        return Ok(());
    }
    config.chat = prefs.clone();
    save_config_to_path(&config, path)
}

pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let write_error = |path: &Path, source: std::io::Error| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, contents).map_err(|e| write_error(&tmp_path, e))?;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        // Windows refuses to rename over an open file
        warn!("atomic rename failed ({e}), writing {} directly", path.display());
        std::fs::write(path, contents).map_err(|e| write_error(path, e))?;
        let _ = std::fs::remove_file(&tmp_path);
    }
    Ok(())
}
