//! Navigation, page text, and teardown.

use std::sync::Arc;

use pagechat_common::NavigationId;
use tracing::{debug, warn};

use super::ChatDriver;
use crate::dispatch::EngineEventKind;

/// Page text is cut to this many characters. Leaves room for the prompt and
/// the answer inside a 4096-token Llama 2 context.
pub const MAX_PAGE_CONTENT_CHARS: usize = 8092;

/// Schemes whose documents may be read.
pub const ALLOWED_SCHEMES: [&str; 4] = ["https", "http", "file", "data"];

pub const SUMMARIZE_PAGE: &str = "Summarize this page";
pub const SUMMARIZE_VIDEO: &str = "Summarize this video";

impl ChatDriver {
    /// The tab committed a navigation.
    ///
    /// Same-document navigations (fragment changes, history API) keep the
    /// conversation. Anything else adopts `navigation_id` and starts over.
    pub fn on_navigated(&mut self, navigation_id: NavigationId, is_same_document: bool) {
        self.is_same_document_navigation = is_same_document;
        if is_same_document {
            debug!(%navigation_id, "same-document navigation, keeping conversation");
            return;
        }
        self.navigation_id = navigation_id;
        self.reset_for_navigation();
    }

    pub fn on_document_load_completed(&mut self) {
        self.maybe_generate_page_text();
        self.maybe_generate_questions();
    }

    /// Forget everything about the current page and conversation.
    pub fn reset_for_navigation(&mut self) {
        self.history.clear();
        self.article_text.clear();
        self.suggested_questions.clear();
        self.pending_request = None;
        self.is_page_text_fetch_in_progress = false;
        self.is_request_in_progress = false;
        self.has_generated_questions = false;
        self.should_page_content_be_disconnected = false;
        self.notify_suggested_questions();
        self.set_api_error(None);
        self.engine.clear_all_queries();
        self.dispatcher.cancel_all();

        self.notify_history();
        self.notify_page_has_content();
    }

    /// Reset, and stop reading the page until the next reset.
    pub fn disconnect_page_content(&mut self) {
        self.reset_for_navigation();
        self.should_page_content_be_disconnected = true;
    }

    /// Page text extracted for `navigation_id` has arrived.
    pub fn on_page_text_ready(&mut self, navigation_id: NavigationId, text: String, is_video: bool) {
        if self.is_stale(navigation_id, "page text") {
            return;
        }

        self.is_page_text_fetch_in_progress = false;
        if text.is_empty() {
            debug!("page text empty");
            return;
        }

        let mut text = text;
        truncate_chars(&mut text, MAX_PAGE_CONTENT_CHARS);
        self.engine.sanitize_input(&mut text);
        self.is_video = is_video;
        self.article_text = text;

        self.notify_page_has_content();

        if !self.suggested_questions.is_empty() {
            warn!(
                count = self.suggested_questions.len(),
                "suggested questions present before page text arrived"
            );
        }
        let summarize = if is_video { SUMMARIZE_VIDEO } else { SUMMARIZE_PAGE };
        self.suggested_questions.push(summarize.to_string());
        self.notify_suggested_questions();
        self.maybe_generate_questions();
    }

    pub(super) fn maybe_generate_page_text(&mut self) {
        let Some(url) = self.host.page_url() else {
            return;
        };
        if !ALLOWED_SCHEMES.contains(&url.scheme()) {
            debug!(scheme = url.scheme(), "page scheme not readable");
            return;
        }

        // Once the user has asked something, changing the context under
        // them would be confusing.
        if !self.history.is_empty() {
            return;
        }

        if self.is_page_text_fetch_in_progress
            || !self.article_text.is_empty()
            || !self.has_user_opted_in()
            || !self.is_conversation_active
            || !self.host.is_document_on_load_completed()
        {
            return;
        }

        if !self.host.has_primary_main_frame() {
            debug!(%url, "page has no primary main frame");
            return;
        }

        if self.should_page_content_be_disconnected {
            return;
        }

        debug!(%url, navigation = %self.navigation_id, "fetching page text");
        self.is_page_text_fetch_in_progress = true;
        let host = Arc::clone(&self.host);
        self.dispatcher.spawn(self.navigation_id, move |_| async move {
            let content = host.page_content().await;
            EngineEventKind::PageContent {
                text: content.text,
                is_video: content.is_video,
            }
        });
    }
}

/// Cut `text` to at most `max` characters.
fn truncate_chars(text: &mut String, max: usize) {
    if let Some((byte_idx, _)) = text.char_indices().nth(max) {
        text.truncate(byte_idx);
    }
}
