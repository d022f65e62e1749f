//! Chat preference types.

use serde::{Deserialize, Serialize};

/// User-facing chat preferences.
///
/// These back the [`PrefService`](crate::prefs::PrefService) and are the
/// only section that changes at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatPrefs {
    /// Set once the user has accepted the disclaimer (opt-in consent).
    pub has_seen_disclaimer: bool,
    /// `None` until the user makes an explicit choice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_generate_questions: Option<bool>,
}
