//! Configuration schema types for pagechat.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with sensible defaults.

mod chat;
mod engine;
mod system;

pub use chat::*;
pub use engine::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for pagechat.
///
/// Only override what you want to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PageChatConfig {
    pub chat: ChatPrefs,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
