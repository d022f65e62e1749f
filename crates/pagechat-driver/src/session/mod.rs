//! Single-task owner of a [`ChatDriver`].
//!
//! Host commands, engine results, preference changes and config reloads all
//! arrive on channels and are applied one at a time, so the driver never
//! needs a lock. [`SessionHandle`] is the cloneable front door.

mod handle;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use pagechat_ai::EngineFactory;
use pagechat_common::{ApiError, ConversationTurn, NavigationId, SessionId};
use pagechat_config::{PageChatConfig, PrefKey, PrefService};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::dispatch::EngineEvent;
use crate::driver::{ChatDriver, SubmitOutcome, SuggestedQuestions};
use crate::error::DriverError;
use crate::host::PageHost;
use crate::metrics::ChatMetrics;
use crate::observer::{ChatObserver, ObserverId};

pub use handle::SessionHandle;

const COMMAND_CAPACITY: usize = 64;

/// Requests a [`ChatSession`] understands.
#[derive(Debug)]
pub enum ChatCommand {
    SetActive(bool),
    Submit {
        text: String,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    Retry,
    GenerateQuestions,
    ClearHistory,
    ChangeModel {
        key: String,
        reply: oneshot::Sender<Result<(), DriverError>>,
    },
    Navigated {
        navigation_id: NavigationId,
        is_same_document: bool,
    },
    DocumentLoadCompleted,
    DisconnectPageContent,
    FaviconChanged,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown,
}

/// Read-only copy of the driver's state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub model_key: String,
    pub history: Vec<ConversationTurn>,
    pub suggested: SuggestedQuestions,
    pub is_request_in_progress: bool,
    pub current_error: Option<ApiError>,
    pub has_page_content: bool,
    pub navigation_id: NavigationId,
}

pub struct ChatSession {
    id: SessionId,
    driver: ChatDriver,
    prefs: Arc<PrefService>,
    commands: mpsc::Receiver<ChatCommand>,
    engine_events: mpsc::UnboundedReceiver<EngineEvent>,
    pref_changes: broadcast::Receiver<PrefKey>,
    config: Option<watch::Receiver<PageChatConfig>>,
    /// `engine.model_key` of the last config seen, so a reload only
    /// switches models when the file's choice changes.
    config_model_key: String,
}

impl ChatSession {
    pub fn new(
        prefs: Arc<PrefService>,
        factory: Arc<dyn EngineFactory>,
        host: Arc<dyn PageHost>,
        model_key: &str,
    ) -> Result<(Self, SessionHandle), DriverError> {
        let (events_tx, engine_events) = mpsc::unbounded_channel();
        let driver = ChatDriver::new(Arc::clone(&prefs), factory, host, model_key, events_tx)?;
        let (commands_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let pref_changes = prefs.subscribe();

        let session = Self {
            id: SessionId::new(),
            driver,
            prefs,
            commands,
            engine_events,
            pref_changes,
            config: None,
            config_model_key: model_key.to_string(),
        };
        Ok((session, SessionHandle::new(commands_tx)))
    }

    /// Follow config reloads: `[chat]` goes to the preference store and a
    /// new `engine.model_key` switches the model.
    pub fn with_config_updates(mut self, config: watch::Receiver<PageChatConfig>) -> Self {
        self.config_model_key = config.borrow().engine.model_key.clone();
        self.config = Some(config);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn ChatMetrics>) -> Self {
        self.driver = self.driver.with_metrics(metrics);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ChatObserver>) -> ObserverId {
        self.driver.add_observer(observer)
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Process messages until shut down or every handle is dropped.
    pub async fn run(mut self) {
        info!(session = %self.id, model = %self.driver.current_model().key, "chat session started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(ChatCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(event) = self.engine_events.recv() => {
                    self.driver.handle_engine_event(event);
                }
                change = self.pref_changes.recv() => match change {
                    Ok(key) => self.on_pref_changed(key),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "preference notifications lagged, re-checking all");
                        self.on_pref_changed(PrefKey::HasSeenDisclaimer);
                        self.on_pref_changed(PrefKey::AutoGenerateQuestions);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // The session holds the store, so this cannot close
                        // while it runs
                        debug!("preference channel closed");
                    }
                },
                Some(config) = next_config(&mut self.config) => self.apply_config(config),
            }
        }

        self.driver.reset_for_navigation();
        info!(session = %self.id, "chat session stopped");
    }

    fn handle_command(&mut self, command: ChatCommand) {
        match command {
            ChatCommand::SetActive(active) => self.driver.set_conversation_active(active),
            ChatCommand::Submit { text, reply } => {
                let outcome = self.driver.submit_user_turn(ConversationTurn::human(text));
                let _ = reply.send(outcome);
            }
            ChatCommand::Retry => self.driver.retry_last_request(),
            ChatCommand::GenerateQuestions => self.driver.generate_questions(),
            ChatCommand::ClearHistory => self.driver.clear_conversation_history(),
            ChatCommand::ChangeModel { key, reply } => {
                let _ = reply.send(self.driver.change_model(&key));
            }
            ChatCommand::Navigated {
                navigation_id,
                is_same_document,
            } => self.driver.on_navigated(navigation_id, is_same_document),
            ChatCommand::DocumentLoadCompleted => self.driver.on_document_load_completed(),
            ChatCommand::DisconnectPageContent => self.driver.disconnect_page_content(),
            ChatCommand::FaviconChanged => self.driver.on_favicon_image_data_changed(),
            ChatCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            ChatCommand::Shutdown => {}
        }
    }

    fn on_pref_changed(&mut self, key: PrefKey) {
        debug!(pref = key.name(), "applying preference change");
        match key {
            PrefKey::HasSeenDisclaimer => self.driver.on_user_opted_in(),
            PrefKey::AutoGenerateQuestions => {
                self.driver.on_permission_changed_auto_generate_questions()
            }
        }
    }

    fn apply_config(&mut self, config: PageChatConfig) {
        let changed = self.prefs.apply(config.chat);
        if !changed.is_empty() {
            info!(count = changed.len(), "chat preferences reloaded");
        }

        let model_key = config.engine.model_key;
        if model_key != self.config_model_key {
            if let Err(e) = self.driver.change_model(&model_key) {
                warn!(error = %e, "keeping current model after config reload");
            }
            self.config_model_key = model_key;
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            model_key: self.driver.current_model().key.clone(),
            history: self.driver.conversation_history().to_vec(),
            suggested: self.driver.suggested_questions(),
            is_request_in_progress: self.driver.is_request_in_progress(),
            current_error: self.driver.current_error(),
            has_page_content: self.driver.has_page_content(),
            navigation_id: self.driver.navigation_id(),
        }
    }
}

/// Next reloaded config. Stops yielding once the reload manager is gone.
async fn next_config(config: &mut Option<watch::Receiver<PageChatConfig>>) -> Option<PageChatConfig> {
    let Some(rx) = config.as_mut() else {
        return std::future::pending().await;
    };
    match rx.changed().await {
        Ok(()) => Some(rx.borrow_and_update().clone()),
        Err(_) => {
            debug!("config reload channel closed");
            *config = None;
            None
        }
    }
}
