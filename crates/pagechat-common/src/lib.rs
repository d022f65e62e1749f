pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{ConfigError, PageChatError};
pub use events::{ChatEvent, EventBus};
pub use id::{new_correlation_id, new_id, NavigationId, SessionId};
pub use types::{
    ApiError, AutoGenerateQuestionsPref, CharacterType, ConversationTurn,
    ConversationTurnVisibility, Model, ModelEngineType,
};

pub type Result<T> = std::result::Result<T, PageChatError>;
