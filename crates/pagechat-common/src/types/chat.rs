use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    Human,
    Assistant,
}

/// Whether a turn is rendered in the conversation UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationTurnVisibility {
    Visible,
    Hidden,
}

/// A single entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub character_type: CharacterType,
    pub visibility: ConversationTurnVisibility,
    pub text: String,
}

impl ConversationTurn {
    pub fn human(text: impl Into<String>) -> Self {
        Self {
            character_type: CharacterType::Human,
            visibility: ConversationTurnVisibility::Visible,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            character_type: CharacterType::Assistant,
            visibility: ConversationTurnVisibility::Visible,
            text: text.into(),
        }
    }

    pub fn is_human(&self) -> bool {
        self.character_type == CharacterType::Human
    }
}

/// Error reported by an engine for a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ApiError {
    #[error("connection issue")]
    ConnectionIssue,
    #[error("rate limit reached")]
    RateLimitReached,
    #[error("internal error")]
    InternalError,
}

/// Tri-state view of the auto-generate-questions preference, distinguishing
/// "never set" from an explicit `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoGenerateQuestionsPref {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl AutoGenerateQuestionsPref {
    pub fn from_user_value(value: Option<bool>) -> Self {
        match value {
            None => Self::Unset,
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
        }
    }
}
