//! Background work for the driver.
//!
//! Page fetches and engine calls run as spawned tasks. Each task is a child
//! of the current navigation's [`CancellationToken`]; when the driver resets
//! or navigates away the token is cancelled, the tasks are dropped, and any
//! result they already queued is discarded on delivery.

use std::future::Future;

use pagechat_ai::AiError;
use pagechat_common::NavigationId;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of background work, delivered back to the driver's task.
#[derive(Debug)]
pub enum EngineEventKind {
    PageContent { text: String, is_video: bool },
    Questions(Vec<String>),
    /// Whole answer so far.
    AssistantChunk(String),
    AssistantComplete(Result<String, AiError>),
}

#[derive(Debug)]
pub struct EngineEvent {
    /// Navigation that was current when the work was dispatched.
    pub navigation_id: NavigationId,
    pub kind: EngineEventKind,
    scope: CancellationToken,
}

impl EngineEvent {
    /// An event outside any task scope; never counts as cancelled.
    pub fn new(navigation_id: NavigationId, kind: EngineEventKind) -> Self {
        Self {
            navigation_id,
            kind,
            scope: CancellationToken::new(),
        }
    }

    /// The task that produced this event was cancelled before delivery.
    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }
}

/// Sends events for one task.
#[derive(Debug, Clone)]
pub struct Emitter {
    events: mpsc::UnboundedSender<EngineEvent>,
    navigation_id: NavigationId,
    scope: CancellationToken,
}

impl Emitter {
    pub fn emit(&self, kind: EngineEventKind) {
        if self.scope.is_cancelled() {
            return;
        }
        // Receiver gone means the session is shutting down
        let _ = self.events.send(EngineEvent {
            navigation_id: self.navigation_id,
            kind,
            scope: self.scope.clone(),
        });
    }
}

pub(crate) struct Dispatcher {
    events: mpsc::UnboundedSender<EngineEvent>,
    navigation: CancellationToken,
}

impl Dispatcher {
    pub(crate) fn new(events: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self {
            events,
            navigation: CancellationToken::new(),
        }
    }

    /// Run `make(emitter)` in the background and emit its output.
    pub(crate) fn spawn<F, Fut>(&self, navigation_id: NavigationId, make: F)
    where
        F: FnOnce(Emitter) -> Fut,
        Fut: Future<Output = EngineEventKind> + Send + 'static,
    {
        let emitter = Emitter {
            events: self.events.clone(),
            navigation_id,
            scope: self.navigation.child_token(),
        };
        let scope = emitter.scope.clone();
        let work = make(emitter.clone());
        tokio::spawn(async move {
            tokio::select! {
                _ = scope.cancelled() => {
                    debug!(%navigation_id, "background task cancelled");
                }
                kind = work => emitter.emit(kind),
            }
        });
    }

    /// Cancel every task started so far.
    pub(crate) fn cancel_all(&mut self) {
        self.navigation.cancel();
        self.navigation = CancellationToken::new();
    }
}
