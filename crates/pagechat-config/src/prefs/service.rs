use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use pagechat_common::{AutoGenerateQuestionsPref, ConfigError};
use tokio::sync::broadcast;
use tracing::debug;

use crate::schema::ChatPrefs;
use crate::toml_writer::save_chat_prefs;

/// Preferences the chat driver reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    /// Opt-in consent; required before any request reaches a model.
    HasSeenDisclaimer,
    /// Whether suggested questions are generated without being asked.
    AutoGenerateQuestions,
}

impl PrefKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::HasSeenDisclaimer => "chat.has_seen_disclaimer",
            Self::AutoGenerateQuestions => "chat.auto_generate_questions",
        }
    }
}

pub struct PrefService {
    prefs: RwLock<ChatPrefs>,
    changes: broadcast::Sender<PrefKey>,
    store_path: Option<PathBuf>,
}

impl PrefService {
    /// In-memory store; writes are not persisted.
    pub fn new(prefs: ChatPrefs) -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            prefs: RwLock::new(prefs),
            changes,
            store_path: None,
        }
    }

    /// Store that writes changes back into the `[chat]` section of the
    /// config file at `path`.
    pub fn with_store_path(prefs: ChatPrefs, path: PathBuf) -> Self {
        Self {
            store_path: Some(path),
            ..Self::new(prefs)
        }
    }

    /// Effective boolean value; an unset auto-generate pref reads as `false`.
    pub fn get_boolean(&self, key: PrefKey) -> bool {
        self.user_value(key).unwrap_or(false)
    }

    /// The explicitly stored value, `None` when never set.
    pub fn user_value(&self, key: PrefKey) -> Option<bool> {
        let prefs = self.prefs.read().unwrap_or_else(PoisonError::into_inner);
        match key {
            PrefKey::HasSeenDisclaimer => Some(prefs.has_seen_disclaimer),
            PrefKey::AutoGenerateQuestions => prefs.auto_generate_questions,
        }
    }

    pub fn auto_generate_pref(&self) -> AutoGenerateQuestionsPref {
        AutoGenerateQuestionsPref::from_user_value(
            self.user_value(PrefKey::AutoGenerateQuestions),
        )
    }

    pub fn snapshot(&self) -> ChatPrefs {
        self.prefs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_boolean(&self, key: PrefKey, value: bool) -> Result<(), ConfigError> {
        self.update(|prefs| match key {
            PrefKey::HasSeenDisclaimer => prefs.has_seen_disclaimer = value,
            PrefKey::AutoGenerateQuestions => prefs.auto_generate_questions = Some(value),
        })
    }

    /// Return a preference to its unset state.
    pub fn clear(&self, key: PrefKey) -> Result<(), ConfigError> {
        self.update(|prefs| match key {
            PrefKey::HasSeenDisclaimer => prefs.has_seen_disclaimer = false,
            PrefKey::AutoGenerateQuestions => prefs.auto_generate_questions = None,
        })
    }

    /// Adopt prefs read from a reloaded config file without writing them back.
    pub fn apply(&self, incoming: ChatPrefs) -> Vec<PrefKey> {
        let changed = {
            let mut prefs = self.prefs.write().unwrap_or_else(PoisonError::into_inner);
            let changed = diff(&prefs, &incoming);
            *prefs = incoming;
            changed
        };
        self.notify(&changed);
        changed
    }

    /// Receive the key of every preference whose value changes.
    pub fn subscribe(&self) -> broadcast::Receiver<PrefKey> {
        self.changes.subscribe()
    }

    fn update(&self, mutate: impl FnOnce(&mut ChatPrefs)) -> Result<(), ConfigError> {
        let changed = {
            let mut prefs = self.prefs.write().unwrap_or_else(PoisonError::into_inner);
            let mut next = prefs.clone();
            mutate(&mut next);
            let changed = diff(&prefs, &next);
            if changed.is_empty() {
                return Ok(());
            }
            // Only a persisted value becomes visible
            if let Some(path) = &self.store_path {
                save_chat_prefs(&next, path)?;
            }
            *prefs = next;
            changed
        };
        self.notify(&changed);
        Ok(())
    }

    fn notify(&self, changed: &[PrefKey]) {
        for key in changed {
            debug!(pref = key.name(), "preference changed");
            // No subscribers is fine
            let _ = self.changes.send(*key);
        }
    }
}

impl Default for PrefService {
    fn default() -> Self {
        Self::new(ChatPrefs::default())
    }
}

fn diff(before: &ChatPrefs, after: &ChatPrefs) -> Vec<PrefKey> {
    let mut changed = Vec::new();
    if before.has_seen_disclaimer != after.has_seen_disclaimer {
        changed.push(PrefKey::HasSeenDisclaimer);
    }
    if before.auto_generate_questions != after.auto_generate_questions {
        changed.push(PrefKey::AutoGenerateQuestions);
    }
    changed
}
