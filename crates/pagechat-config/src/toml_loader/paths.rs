//! Where the config file lives and how a fresh one is created.

use std::path::{Path, PathBuf};

use pagechat_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;
use crate::toml_writer::write_atomic;

/// `<config dir>/pagechat/config.toml`, e.g. `~/.config/pagechat/config.toml`
/// on Linux.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("pagechat").join("config.toml"))
        .ok_or_else(|| ConfigError::FileNotFound(PathBuf::from("<config dir>/pagechat/config.toml")))
}

/// Write the commented template to `path`.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    write_atomic(path, &default_config_toml())?;
    info!("created default config at {}", path.display());
    Ok(())
}
