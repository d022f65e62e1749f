//! The conversation state machine.
//!
//! A [`ChatDriver`] belongs to one tab. It is not thread-safe by itself: every
//! method runs on the task that owns it (see [`crate::session`]), and the
//! background work it starts reports back as [`EngineEvent`]s that the owner
//! passes to [`ChatDriver::handle_engine_event`].
//!
//! Split into submodules:
//! - `content`: navigation, page text fetch, reset
//! - `questions`: suggested question generation
//! - `requests`: user turns, retries, streamed answers

mod content;
mod questions;
mod requests;


use std::sync::Arc;

use pagechat_ai::{model_by_key, EngineConsumer, EngineFactory};
use pagechat_common::{ApiError, ConversationTurn, Model, NavigationId};
use pagechat_config::{PrefKey, PrefService};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dispatch::{Dispatcher, EngineEvent, EngineEventKind};
use crate::error::DriverError;
use crate::host::PageHost;
use crate::metrics::ChatMetrics;
use crate::observer::{ChatObserver, ObserverId, ObserverList};

pub use content::{ALLOWED_SCHEMES, MAX_PAGE_CONTENT_CHARS, SUMMARIZE_PAGE, SUMMARIZE_VIDEO};
pub use questions::SuggestedQuestions;
pub use requests::{SubmitOutcome, SUMMARIZE_VIDEO_BULLETS};

pub struct ChatDriver {
    prefs: Arc<PrefService>,
    factory: Arc<dyn EngineFactory>,
    engine: Arc<dyn EngineConsumer>,
    host: Arc<dyn PageHost>,
    metrics: Option<Arc<dyn ChatMetrics>>,
    observers: ObserverList,
    dispatcher: Dispatcher,

    model: &'static Model,
    history: Vec<ConversationTurn>,
    article_text: String,
    is_video: bool,
    suggested_questions: Vec<String>,
    pending_request: Option<ConversationTurn>,
    current_error: Option<ApiError>,

    navigation_id: NavigationId,
    is_same_document_navigation: bool,

    is_conversation_active: bool,
    is_page_text_fetch_in_progress: bool,
    is_request_in_progress: bool,
    has_generated_questions: bool,
    should_page_content_be_disconnected: bool,
}

impl ChatDriver {
    /// Create a driver using the engine for `model_key`.
    ///
    /// Background results are sent to `events`; the owner must feed them
    /// back through [`handle_engine_event`](Self::handle_engine_event).
    pub fn new(
        prefs: Arc<PrefService>,
        factory: Arc<dyn EngineFactory>,
        host: Arc<dyn PageHost>,
        model_key: &str,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Result<Self, DriverError> {
        let model = lookup_model(model_key)?;
        let engine = factory.create(model)?;

        Ok(Self {
            prefs,
            factory,
            engine,
            host,
            metrics: None,
            observers: ObserverList::default(),
            dispatcher: Dispatcher::new(events),
            model,
            history: Vec::new(),
            article_text: String::new(),
            is_video: false,
            suggested_questions: Vec::new(),
            pending_request: None,
            current_error: None,
            navigation_id: NavigationId::default(),
            is_same_document_navigation: false,
            is_conversation_active: false,
            is_page_text_fetch_in_progress: false,
            is_request_in_progress: false,
            has_generated_questions: false,
            should_page_content_be_disconnected: false,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn ChatMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Switch to another model. The conversation is kept.
    pub fn change_model(&mut self, model_key: &str) -> Result<(), DriverError> {
        let model = lookup_model(model_key)?;
        self.engine = self.factory.create(model)?;
        self.model = model;
        info!(model = %model.key, "model changed");
        Ok(())
    }

    pub fn current_model(&self) -> &'static Model {
        self.model
    }

    pub fn conversation_history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn is_request_in_progress(&self) -> bool {
        self.is_request_in_progress
    }

    pub fn current_error(&self) -> Option<ApiError> {
        self.current_error
    }

    pub fn has_page_content(&self) -> bool {
        !self.article_text.is_empty()
    }

    pub fn is_conversation_active(&self) -> bool {
        self.is_conversation_active
    }

    pub fn navigation_id(&self) -> NavigationId {
        self.navigation_id
    }

    pub fn is_same_document_navigation(&self) -> bool {
        self.is_same_document_navigation
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ChatObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn on_favicon_image_data_changed(&self) {
        self.observers
            .for_each(|o| o.on_favicon_image_data_changed());
    }

    /// Route a background result to its handler. Results of cancelled
    /// tasks are dropped here.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if event.is_cancelled() {
            debug!(navigation = %event.navigation_id, "dropping result of cancelled task");
            return;
        }
        let navigation_id = event.navigation_id;
        match event.kind {
            EngineEventKind::PageContent { text, is_video } => {
                self.on_page_text_ready(navigation_id, text, is_video)
            }
            EngineEventKind::Questions(questions) => {
                self.on_questions_generated(navigation_id, questions)
            }
            EngineEventKind::AssistantChunk(text) => self.on_assistant_chunk(navigation_id, text),
            EngineEventKind::AssistantComplete(result) => {
                self.on_assistant_complete(navigation_id, result)
            }
        }
    }

    fn has_user_opted_in(&self) -> bool {
        self.prefs.get_boolean(PrefKey::HasSeenDisclaimer)
    }

    fn is_stale(&self, navigation_id: NavigationId, what: &str) -> bool {
        if navigation_id != self.navigation_id {
            debug!(
                %navigation_id,
                current = %self.navigation_id,
                "{what} for a different navigation, ignoring"
            );
            return true;
        }
        false
    }

    fn notify_history(&self) {
        self.observers
            .for_each(|o| o.on_history_update(&self.history));
    }

    fn notify_page_has_content(&self) {
        let has_content = self.has_page_content();
        self.observers
            .for_each(|o| o.on_page_has_content(has_content));
    }

    fn notify_suggested_questions(&self) {
        let auto_generate = self.prefs.auto_generate_pref();
        self.observers.for_each(|o| {
            o.on_suggested_questions_changed(
                &self.suggested_questions,
                self.has_generated_questions,
                auto_generate,
            )
        });
    }

    fn notify_request_in_progress(&self) {
        let in_progress = self.is_request_in_progress;
        self.observers
            .for_each(|o| o.on_api_request_in_progress(in_progress));
    }

    fn set_api_error(&mut self, error: Option<ApiError>) {
        self.current_error = error;
        self.observers.for_each(|o| o.on_api_response_error(error));
    }
}

fn lookup_model(key: &str) -> Result<&'static Model, DriverError> {
    model_by_key(key).ok_or_else(|| DriverError::UnknownModel(key.to_string()))
}
