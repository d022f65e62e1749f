use pagechat_common::NavigationId;
use tokio::sync::{mpsc, oneshot};

use super::{ChatCommand, SessionSnapshot};
use crate::driver::SubmitOutcome;
use crate::error::DriverError;

/// Cloneable sender side of a running [`ChatSession`](super::ChatSession).
///
/// Every method fails with [`DriverError::SessionClosed`] once the session
/// has stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<ChatCommand>,
}

impl SessionHandle {
    pub(super) fn new(commands: mpsc::Sender<ChatCommand>) -> Self {
        Self { commands }
    }

    pub async fn send(&self, command: ChatCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| DriverError::SessionClosed)
    }

    pub async fn set_active(&self, is_active: bool) -> Result<(), DriverError> {
        self.send(ChatCommand::SetActive(is_active)).await
    }

    pub async fn submit(&self, text: impl Into<String>) -> Result<SubmitOutcome, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(ChatCommand::Submit {
            text: text.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| DriverError::SessionClosed)
    }

    pub async fn retry(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::Retry).await
    }

    pub async fn generate_questions(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::GenerateQuestions).await
    }

    pub async fn clear_history(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::ClearHistory).await
    }

    pub async fn change_model(&self, key: impl Into<String>) -> Result<(), DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(ChatCommand::ChangeModel {
            key: key.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| DriverError::SessionClosed)?
    }

    pub async fn navigated(
        &self,
        navigation_id: NavigationId,
        is_same_document: bool,
    ) -> Result<(), DriverError> {
        self.send(ChatCommand::Navigated {
            navigation_id,
            is_same_document,
        })
        .await
    }

    pub async fn document_load_completed(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::DocumentLoadCompleted).await
    }

    pub async fn disconnect_page_content(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::DisconnectPageContent).await
    }

    pub async fn favicon_changed(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::FaviconChanged).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, DriverError> {
        let (reply, rx) = oneshot::channel();
        self.send(ChatCommand::Snapshot(reply)).await?;
        rx.await.map_err(|_| DriverError::SessionClosed)
    }

    pub async fn shutdown(&self) -> Result<(), DriverError> {
        self.send(ChatCommand::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
