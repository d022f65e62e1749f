//! Claude engine struct, request building, and response parsing.

use std::sync::OnceLock;

use pagechat_common::{CharacterType, ConversationTurn, Model};
use regex::Regex;

use crate::factory::EngineSettings;
use crate::http::{build_client, InFlightQueries};
use crate::prompts::alternating_turns;
use crate::AiError;

use super::config::{AuthMethod, ClaudeCredentials};

pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude-backed engine.
pub struct ClaudeRemote {
    pub(crate) model: Model,
    pub(crate) credentials: ClaudeCredentials,
    pub(crate) api_url: String,
    pub(crate) max_tokens: u32,
    pub(crate) http: reqwest::Client,
    pub(crate) queries: InFlightQueries,
}

impl ClaudeRemote {
    pub fn new(
        model: Model,
        credentials: ClaudeCredentials,
        settings: &EngineSettings,
    ) -> Result<Self, AiError> {
        Ok(Self {
            model,
            credentials,
            api_url: settings.claude_api_url.clone(),
            max_tokens: settings.max_tokens,
            http: build_client(settings)?,
            queries: InFlightQueries::new(),
        })
    }

    /// Turn markers and our own content tags; user text containing them
    /// could hijack the prompt structure.
    pub(crate) fn sanitize_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"(?i)\n\n(human|assistant):|</?(page|transcript|question)>")
                .expect("valid sanitize regex")
        })
    }

    pub(crate) fn request(&self) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .post(&self.api_url)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json");
        match self.credentials.auth_method {
            AuthMethod::ApiKey => builder.header("x-api-key", &self.credentials.token),
            AuthMethod::OAuth => builder.bearer_auth(&self.credentials.token),
        }
    }

    /// Build the JSON request body for the Messages API.
    pub(crate) fn build_request_body(
        &self,
        system: String,
        history: &[ConversationTurn],
        human_input: &str,
        stream: bool,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model.name,
            "max_tokens": self.max_tokens,
            "system": system,
            "messages": build_messages(history, human_input),
        });
        if stream {
            body["stream"] = serde_json::json!(true);
        }
        body
    }

    /// Text of the first text block of a non-streaming response.
    pub(crate) fn parse_response_text(json: &serde_json::Value) -> Result<String, AiError> {
        json["content"]
            .as_array()
            .and_then(|blocks| {
                blocks.iter().find_map(|b| {
                    if b["type"] == "text" {
                        b["text"].as_str().map(String::from)
                    } else {
                        None
                    }
                })
            })
            .ok_or_else(|| AiError::ParseError("no text block in response".into()))
    }
}

/// Messages API form of the conversation: `user`/`assistant` roles only.
pub(crate) fn build_messages(history: &[ConversationTurn], human_input: &str) -> Vec<serde_json::Value> {
    alternating_turns(history, human_input)
        .into_iter()
        .map(|(role, content)| {
            let role = match role {
                CharacterType::Human => "user",
                CharacterType::Assistant => "assistant",
            };
            serde_json::json!({ "role": role, "content": content })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::model_by_key;

    fn engine() -> ClaudeRemote {
        ClaudeRemote::new(
            model_by_key("chat-claude-instant").unwrap().clone(),
            ClaudeCredentials::new("test", AuthMethod::ApiKey),
            &EngineSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn messages_alternate_and_end_with_input() {
        let history = vec![
            ConversationTurn::human("a"),
            ConversationTurn::assistant("b"),
        ];
        let msgs = build_messages(&history, "c");
        assert_eq!(msgs.len(), 3);
        assert_eq!(msgs[0]["role"], "user");
        assert_eq!(msgs[1]["role"], "assistant");
        assert_eq!(msgs[2]["role"], "user");
        assert_eq!(msgs[2]["content"], "c");
    }

    #[test]
    fn request_body_carries_model_and_stream_flag() {
        let engine = engine();
        let body = engine.build_request_body("sys".into(), &[], "q", true);
        assert_eq!(body["model"], "claude-instant-v1");
        assert_eq!(body["max_tokens"], 800);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["stream"], true);

        let body = engine.build_request_body("sys".into(), &[], "q", false);
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn parses_first_text_block() {
        let json = serde_json::json!({
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "<question>Why?</question>"}
            ]
        });
        assert_eq!(
            ClaudeRemote::parse_response_text(&json).unwrap(),
            "<question>Why?</question>"
        );
    }

    #[test]
    fn missing_text_block_is_parse_error() {
        let json = serde_json::json!({ "content": [] });
        assert!(matches!(
            ClaudeRemote::parse_response_text(&json),
            Err(AiError::ParseError(_))
        ));
    }
}
