//! Scripted collaborators for driver and session tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pagechat_ai::{AiError, ChunkCallback, EngineConsumer, EngineFactory};
use pagechat_common::{ApiError, AutoGenerateQuestionsPref, ConversationTurn, Model};
use url::Url;

use crate::host::{PageContent, PageHost};
use crate::observer::ChatObserver;

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub history: Vec<ConversationTurn>,
    pub question: String,
    pub page_content: String,
    pub is_video: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Stream `chunks` (cumulative) then finish with the last one.
    Text(Vec<String>),
    /// Stream one chunk, then lose the connection.
    Partial(String),
    RateLimited,
    Cancelled,
}

pub(crate) struct FakeEngine {
    pub requests: Mutex<Vec<SentRequest>>,
    pub reply: Mutex<Reply>,
    pub questions: Mutex<Vec<String>>,
    pub question_calls: AtomicUsize,
    pub clears: AtomicUsize,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Mutex::new(Reply::Text(vec![" Hel".into(), " Hello".into()])),
            questions: Mutex::new(vec!["What is it?".into(), "Who wrote it?".into()]),
            question_calls: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }
}

impl FakeEngine {
    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EngineConsumer for FakeEngine {
    fn sanitize_input(&self, text: &mut String) {
        *text = text.replace("<bad>", "");
    }

    async fn generate_question_suggestions(
        &self,
        _is_video: bool,
        _page_content: &str,
    ) -> Result<Vec<String>, AiError> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.questions.lock().unwrap().clone())
    }

    async fn generate_assistant_response(
        &self,
        is_video: bool,
        page_content: &str,
        history: &[ConversationTurn],
        human_input: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(SentRequest {
            history: history.to_vec(),
            question: human_input.to_string(),
            page_content: page_content.to_string(),
            is_video,
        });
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Text(chunks) => {
                for chunk in &chunks {
                    on_chunk(chunk.clone());
                }
                Ok(chunks.last().cloned().unwrap_or_default())
            }
            Reply::Partial(chunk) => {
                on_chunk(chunk);
                Err(AiError::NetworkError("connection reset".into()))
            }
            Reply::RateLimited => Err(AiError::RateLimited),
            Reply::Cancelled => Err(AiError::Cancelled),
        }
    }

    fn clear_all_queries(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Hands out the same [`FakeEngine`] for every model.
pub(crate) struct FakeFactory {
    pub engine: Arc<FakeEngine>,
    pub created: Mutex<Vec<String>>,
}

impl FakeFactory {
    pub fn new(engine: Arc<FakeEngine>) -> Self {
        Self {
            engine,
            created: Mutex::new(Vec::new()),
        }
    }
}

impl EngineFactory for FakeFactory {
    fn create(&self, model: &Model) -> Result<Arc<dyn EngineConsumer>, AiError> {
        self.created.lock().unwrap().push(model.key.clone());
        Ok(self.engine.clone())
    }
}

pub(crate) struct FakeHost {
    pub url: Mutex<Option<Url>>,
    pub loaded: AtomicBool,
    pub has_main_frame: AtomicBool,
    pub content: Mutex<PageContent>,
    pub fetches: AtomicUsize,
}

impl FakeHost {
    pub fn new(url: &str, content: PageContent) -> Self {
        Self {
            url: Mutex::new(Url::parse(url).ok()),
            loaded: AtomicBool::new(true),
            has_main_frame: AtomicBool::new(true),
            content: Mutex::new(content),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageHost for FakeHost {
    fn page_url(&self) -> Option<Url> {
        self.url.lock().unwrap().clone()
    }

    fn is_document_on_load_completed(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn has_primary_main_frame(&self) -> bool {
        self.has_main_frame.load(Ordering::SeqCst)
    }

    async fn page_content(&self) -> PageContent {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.content.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Note {
    History(usize),
    PageHasContent(bool),
    Questions(Vec<String>, bool, AutoGenerateQuestionsPref),
    InProgress(bool),
    Error(Option<ApiError>),
    Favicon,
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    pub notes: Mutex<Vec<Note>>,
}

impl RecordingObserver {
    pub fn take(&self) -> Vec<Note> {
        std::mem::take(&mut *self.notes.lock().unwrap())
    }

    fn push(&self, note: Note) {
        self.notes.lock().unwrap().push(note);
    }
}

impl ChatObserver for RecordingObserver {
    fn on_history_update(&self, history: &[ConversationTurn]) {
        self.push(Note::History(history.len()));
    }

    fn on_page_has_content(&self, has_content: bool) {
        self.push(Note::PageHasContent(has_content));
    }

    fn on_suggested_questions_changed(
        &self,
        questions: &[String],
        has_generated: bool,
        auto_generate: AutoGenerateQuestionsPref,
    ) {
        self.push(Note::Questions(questions.to_vec(), has_generated, auto_generate));
    }

    fn on_api_request_in_progress(&self, in_progress: bool) {
        self.push(Note::InProgress(in_progress));
    }

    fn on_api_response_error(&self, error: Option<ApiError>) {
        self.push(Note::Error(error));
    }

    fn on_favicon_image_data_changed(&self) {
        self.push(Note::Favicon);
    }
}
