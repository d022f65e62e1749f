//! Observer fan-out for driver state changes.

use std::sync::Arc;

use pagechat_common::{
    ApiError, AutoGenerateQuestionsPref, ChatEvent, ConversationTurn, EventBus,
};

/// Receives driver notifications. Every method defaults to a no-op.
pub trait ChatObserver: Send + Sync {
    fn on_history_update(&self, _history: &[ConversationTurn]) {}

    fn on_page_has_content(&self, _has_content: bool) {}

    fn on_suggested_questions_changed(
        &self,
        _questions: &[String],
        _has_generated: bool,
        _auto_generate: AutoGenerateQuestionsPref,
    ) {
    }

    fn on_api_request_in_progress(&self, _in_progress: bool) {}

    fn on_api_response_error(&self, _error: Option<ApiError>) {}

    fn on_favicon_image_data_changed(&self) {}
}

/// Handle returned by [`ObserverList::add`], used to remove the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(ObserverId, Arc<dyn ChatObserver>)>,
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: Arc<dyn ChatObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn for_each(&self, mut f: impl FnMut(&dyn ChatObserver)) {
        for (_, observer) in &self.entries {
            f(observer.as_ref());
        }
    }
}

/// Republishes observer callbacks on an [`EventBus`].
pub struct BusObserver {
    bus: Arc<EventBus>,
}

impl BusObserver {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl ChatObserver for BusObserver {
    fn on_history_update(&self, history: &[ConversationTurn]) {
        self.bus.publish(ChatEvent::HistoryUpdated {
            history: history.to_vec(),
        });
    }

    fn on_page_has_content(&self, has_content: bool) {
        self.bus.publish(ChatEvent::PageHasContent { has_content });
    }

    fn on_suggested_questions_changed(
        &self,
        questions: &[String],
        has_generated: bool,
        auto_generate: AutoGenerateQuestionsPref,
    ) {
        self.bus.publish(ChatEvent::SuggestedQuestionsChanged {
            questions: questions.to_vec(),
            has_generated,
            auto_generate,
        });
    }

    fn on_api_request_in_progress(&self, in_progress: bool) {
        self.bus.publish(ChatEvent::RequestInProgress(in_progress));
    }

    fn on_api_response_error(&self, error: Option<ApiError>) {
        self.bus.publish(ChatEvent::ApiResponseError(error));
    }

    fn on_favicon_image_data_changed(&self) {
        self.bus.publish(ChatEvent::FaviconImageDataChanged);
    }
}
