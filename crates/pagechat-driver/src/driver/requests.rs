//! User turns and streamed answers.

use std::sync::Arc;

use pagechat_ai::{AiError, ChunkCallback};
use pagechat_common::{CharacterType, ConversationTurn, NavigationId};
use tracing::{debug, warn};

use super::content::SUMMARIZE_VIDEO;
use super::ChatDriver;
use crate::dispatch::EngineEventKind;

/// Sent to the model in place of the "Summarize this video" suggestion.
pub const SUMMARIZE_VIDEO_BULLETS: &str =
    "Summarize this video in a bulleted list of its key points";

/// What happened to a submitted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Sent to the engine.
    Sent,
    /// Held until the user opts in and the conversation is active. Replaces
    /// any turn held before it.
    Queued,
    /// Rejected because an answer is still streaming.
    Busy,
}

impl ChatDriver {
    /// The chat panel was shown or hidden.
    pub fn set_conversation_active(&mut self, is_active: bool) {
        self.is_conversation_active = is_active;
        debug!(is_active, "conversation active changed");
        if self.maybe_pop_pending_request() {
            return;
        }
        self.maybe_generate_page_text();
        self.maybe_generate_questions();
    }

    /// The opt-in preference changed.
    pub fn on_user_opted_in(&mut self) {
        if !self.maybe_pop_pending_request() {
            self.maybe_generate_page_text();
        }

        if self.has_user_opted_in() {
            if let Some(metrics) = &self.metrics {
                metrics.record_enabled();
            }
        }
    }

    pub fn submit_user_turn(&mut self, turn: ConversationTurn) -> SubmitOutcome {
        if !self.is_conversation_active || !self.has_user_opted_in() {
            if self.pending_request.replace(turn).is_some() {
                debug!("replaced pending request");
            } else {
                debug!("request held until opt-in and activation");
            }
            return SubmitOutcome::Queued;
        }

        if self.is_request_in_progress {
            warn!("request rejected, another one is in progress");
            return SubmitOutcome::Busy;
        }

        self.send_request(turn);
        SubmitOutcome::Sent
    }

    /// Resend the most recent human turn, dropping it and everything after.
    pub fn retry_last_request(&mut self) {
        if self.is_request_in_progress {
            debug!("retry ignored, request in progress");
            return;
        }
        if self.history.is_empty() {
            return;
        }

        self.set_api_error(None);

        let Some(pos) = self.history.iter().rposition(ConversationTurn::is_human) else {
            return;
        };
        let turn = self.history[pos].clone();
        self.history.truncate(pos);
        if self.submit_user_turn(turn) != SubmitOutcome::Sent {
            self.notify_history();
        }
    }

    /// Clear the conversation but keep the page.
    pub fn clear_conversation_history(&mut self) {
        self.history.clear();
        self.engine.clear_all_queries();
        self.notify_history();
    }

    /// Cumulative answer text for the current request.
    pub fn on_assistant_chunk(&mut self, navigation_id: NavigationId, text: String) {
        if self.is_stale(navigation_id, "assistant chunk") {
            return;
        }
        self.update_or_create_last_assistant_entry(text);
        self.notify_request_in_progress();
    }

    pub fn on_assistant_complete(
        &mut self,
        navigation_id: NavigationId,
        result: Result<String, AiError>,
    ) {
        if self.is_stale(navigation_id, "assistant response") {
            return;
        }

        self.is_request_in_progress = false;
        match result {
            Ok(text) => {
                if !text.is_empty() {
                    self.update_or_create_last_assistant_entry(text);
                }
            }
            Err(e) => match e.api_error() {
                Some(error) => {
                    warn!(error = %e, "assistant request failed");
                    self.set_api_error(Some(error));
                }
                None => debug!("assistant request cancelled"),
            },
        }
        self.notify_request_in_progress();

        // A turn queued while this one was streaming can go now
        self.maybe_pop_pending_request();
    }

    fn maybe_pop_pending_request(&mut self) -> bool {
        if !self.is_conversation_active || !self.has_user_opted_in() {
            return false;
        }
        if self.is_request_in_progress {
            return false;
        }
        let Some(turn) = self.pending_request.take() else {
            return false;
        };
        debug!("sending pending request");
        self.send_request(turn);
        true
    }

    fn send_request(&mut self, mut turn: ConversationTurn) {
        debug_assert!(turn.is_human(), "only human turns are sent");

        let mut is_suggested_question = false;
        if let Some(pos) = self.suggested_questions.iter().position(|q| *q == turn.text) {
            is_suggested_question = true;
            self.suggested_questions.remove(pos);
            self.notify_suggested_questions();
        }

        self.engine.sanitize_input(&mut turn.text);

        let question = if turn.text == SUMMARIZE_VIDEO {
            SUMMARIZE_VIDEO_BULLETS.to_string()
        } else {
            turn.text.clone()
        };

        // Suggestions were made from the page alone, so they go without history
        let history = if is_suggested_question {
            Vec::new()
        } else {
            self.history.clone()
        };

        debug!(
            navigation = %self.navigation_id,
            turns = history.len(),
            suggested = is_suggested_question,
            "sending request"
        );
        let engine = Arc::clone(&self.engine);
        let article_text = self.article_text.clone();
        let is_video = self.is_video;
        self.dispatcher.spawn(self.navigation_id, move |emitter| async move {
            let on_chunk: ChunkCallback = Box::new(move |text| {
                emitter.emit(EngineEventKind::AssistantChunk(text));
            });
            let result = engine
                .generate_assistant_response(is_video, &article_text, &history, &question, on_chunk)
                .await;
            EngineEventKind::AssistantComplete(result)
        });

        self.add_to_conversation_history(turn);
        self.is_request_in_progress = true;
        self.notify_request_in_progress();
    }

    fn add_to_conversation_history(&mut self, turn: ConversationTurn) {
        let is_human = turn.is_human();
        self.history.push(turn);
        self.notify_history();

        if let Some(metrics) = &self.metrics {
            if self.history.len() == 1 {
                metrics.record_new_chat();
            }
            if is_human {
                metrics.record_new_prompt();
            }
        }
    }

    fn update_or_create_last_assistant_entry(&mut self, text: String) {
        let text = text.trim_start().to_string();
        match self.history.last_mut() {
            Some(last) if last.character_type == CharacterType::Assistant => {
                last.text = text;
                self.notify_history();
            }
            _ => self.add_to_conversation_history(ConversationTurn::assistant(text)),
        }
    }
}
