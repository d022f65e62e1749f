//! Suggested question generation.

use std::sync::Arc;

use pagechat_common::{AutoGenerateQuestionsPref, NavigationId};
use pagechat_config::PrefKey;
use tracing::{debug, warn};

use super::ChatDriver;
use crate::dispatch::EngineEventKind;

/// Current suggestions and whether more can be asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedQuestions {
    pub questions: Vec<String>,
    /// Generation has not run yet and there is page text to run it on.
    pub can_generate: bool,
    pub auto_generate: AutoGenerateQuestionsPref,
}

impl ChatDriver {
    pub fn suggested_questions(&self) -> SuggestedQuestions {
        SuggestedQuestions {
            questions: self.suggested_questions.clone(),
            can_generate: !self.has_generated_questions && !self.article_text.is_empty(),
            auto_generate: self.prefs.auto_generate_pref(),
        }
    }

    /// Ask the engine for questions about the page.
    pub fn generate_questions(&mut self) {
        if !self.has_user_opted_in() || !self.is_conversation_active {
            warn!("question generation requested before opt-in or activation");
            return;
        }
        if self.article_text.is_empty() {
            return;
        }
        // Only once per page: the summarize entry is the one allowed
        if self.suggested_questions.len() > 1 {
            return;
        }
        if !self.history.is_empty() {
            return;
        }

        debug!(navigation = %self.navigation_id, "generating questions");
        self.has_generated_questions = true;
        self.notify_suggested_questions();

        let engine = Arc::clone(&self.engine);
        let article_text = self.article_text.clone();
        let is_video = self.is_video;
        self.dispatcher.spawn(self.navigation_id, move |_| async move {
            let questions = engine
                .generate_question_suggestions(is_video, &article_text)
                .await
                .unwrap_or_else(|e| {
                    if e.api_error().is_some() {
                        warn!(error = %e, "question generation failed");
                    }
                    Vec::new()
                });
            EngineEventKind::Questions(questions)
        });
    }

    pub fn on_questions_generated(&mut self, navigation_id: NavigationId, questions: Vec<String>) {
        if self.is_stale(navigation_id, "questions") {
            return;
        }
        debug!(count = questions.len(), "questions received");
        self.suggested_questions.extend(questions);
        self.notify_suggested_questions();
    }

    /// The auto-generate preference changed.
    pub fn on_permission_changed_auto_generate_questions(&mut self) {
        self.maybe_generate_questions();
    }

    pub(super) fn maybe_generate_questions(&mut self) {
        let can_auto_fetch = self.has_user_opted_in()
            && self.is_conversation_active
            && self.prefs.get_boolean(PrefKey::AutoGenerateQuestions)
            && !self.article_text.is_empty()
            && self.suggested_questions.len() <= 1;
        if can_auto_fetch {
            self.generate_questions();
        }
    }
}
