use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{ApiError, AutoGenerateQuestionsPref, ConversationTurn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ChatEvent {
    HistoryUpdated {
        history: Vec<ConversationTurn>,
    },
    PageHasContent {
        has_content: bool,
    },
    SuggestedQuestionsChanged {
        questions: Vec<String>,
        has_generated: bool,
        auto_generate: AutoGenerateQuestionsPref,
    },
    RequestInProgress(bool),
    ApiResponseError(Option<ApiError>),
    FaviconImageDataChanged,
    Shutdown,
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<ChatEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChatEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ChatEvent::RequestInProgress(true));

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ChatEvent::RequestInProgress(true)));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ChatEvent::Shutdown);

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert!(matches!(e1, ChatEvent::Shutdown));
        assert!(matches!(e2, ChatEvent::Shutdown));
    }

    #[tokio::test]
    async fn history_and_question_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ChatEvent::HistoryUpdated {
            history: vec![ConversationTurn::human("hello")],
        });
        bus.publish(ChatEvent::SuggestedQuestionsChanged {
            questions: vec!["Summarize this page".into()],
            has_generated: false,
            auto_generate: AutoGenerateQuestionsPref::Unset,
        });
        bus.publish(ChatEvent::ApiResponseError(Some(ApiError::RateLimitReached)));

        let e1 = rx.recv().await.unwrap();
        assert!(
            matches!(e1, ChatEvent::HistoryUpdated { ref history } if history[0].text == "hello")
        );

        let e2 = rx.recv().await.unwrap();
        assert!(
            matches!(e2, ChatEvent::SuggestedQuestionsChanged { ref questions, .. } if questions.len() == 1)
        );

        let e3 = rx.recv().await.unwrap();
        assert!(matches!(
            e3,
            ChatEvent::ApiResponseError(Some(ApiError::RateLimitReached))
        ));
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(ChatEvent::Shutdown), 0);
    }

    #[tokio::test]
    async fn publish_returns_subscriber_count() {
        let bus = EventBus::new(16);
        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();

        assert_eq!(bus.publish(ChatEvent::FaviconImageDataChanged), 2);
    }

    #[test]
    fn unknown_event_deserializes() {
        let json = r#"{"type":"SomeNewEventWeNeverHeardOf","data":null}"#;
        let event: ChatEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(event, ChatEvent::Unknown));
    }
}
