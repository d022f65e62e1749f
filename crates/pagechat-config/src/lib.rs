//! pagechat configuration.
//!
//! A TOML file (`config.toml`) with `[chat]`, `[engine]` and `[logging]`
//! sections, every field defaulted so partial files work. On top of it:
//! - [`PrefService`]: the `[chat]` preferences with change notification
//!   and write-back
//! - [`ReloadManager`]: re-reads the file on change and publishes it
//! - [`validation`]: range and format checks, all errors reported at once
//!
//! ```rust,no_run
//! use pagechat_config::{toml_loader, PrefKey, PrefService};
//!
//! let path = toml_loader::default_config_path()?;
//! let config = toml_loader::load_or_default(&path)?;
//! let prefs = PrefService::with_store_path(config.chat, path);
//! prefs.set_boolean(PrefKey::HasSeenDisclaimer, true)?;
//! # Ok::<(), pagechat_common::ConfigError>(())
//! ```

pub mod prefs;
pub mod reload;
pub mod schema;
pub mod toml_loader;
pub mod toml_writer;
pub mod validation;
pub mod watcher;

pub use prefs::{PrefKey, PrefService};
pub use reload::ReloadManager;
pub use schema::{PageChatConfig, CONFIG_SCHEMA_VERSION};
pub use toml_writer::{save_chat_prefs, save_config_to_path};
pub use watcher::ConfigWatcher;
