//! The page the chat is attached to.

use async_trait::async_trait;
use url::Url;

/// Extracted page text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    pub text: String,
    /// The text is a video transcript rather than page body text.
    pub is_video: bool,
}

impl PageContent {
    pub fn page(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_video: false,
        }
    }

    pub fn video(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_video: true,
        }
    }
}

/// Host-side view of the current document.
#[async_trait]
pub trait PageHost: Send + Sync {
    /// URL of the committed document, if any.
    fn page_url(&self) -> Option<Url>;

    fn is_document_on_load_completed(&self) -> bool;

    fn has_primary_main_frame(&self) -> bool;

    /// Extract the document's text. Failures yield empty text.
    async fn page_content(&self) -> PageContent;
}
