use pagechat_ai::AiError;
use pagechat_common::PageChatError;

/// Errors returned by driver operations that have a caller to report to.
///
/// Engine failures during a conversation never come back this way; they are
/// stored as the current API error and handed to observers.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("unknown model key: {0}")]
    UnknownModel(String),

    #[error("failed to start engine: {0}")]
    Engine(#[from] AiError),

    #[error("chat session has shut down")]
    SessionClosed,
}

impl From<DriverError> for PageChatError {
    fn from(e: DriverError) -> Self {
        PageChatError::Driver(Box::new(e))
    }
}
