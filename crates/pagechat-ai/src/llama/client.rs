//! Llama engine struct, request building, and response parsing.

use std::sync::OnceLock;

use pagechat_common::Model;
use regex::Regex;

use crate::factory::EngineSettings;
use crate::http::{build_client, InFlightQueries};
use crate::AiError;

use super::prompt::STOP_SEQUENCES;

/// Sampling temperature for answers. Question suggestions run cooler.
const ANSWER_TEMPERATURE: f32 = 0.7;
pub(crate) const QUESTION_TEMPERATURE: f32 = 0.2;

/// Llama-backed engine.
pub struct LlamaRemote {
    pub(crate) model: Model,
    pub(crate) api_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) max_tokens: u32,
    pub(crate) http: reqwest::Client,
    pub(crate) queries: InFlightQueries,
}

impl LlamaRemote {
    /// The server needs no credentials unless `LLAMA_API_KEY` is set.
    pub fn new(model: Model, settings: &EngineSettings) -> Result<Self, AiError> {
        let api_key = std::env::var("LLAMA_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        Ok(Self {
            model,
            api_url: settings.llama_api_url.clone(),
            api_key,
            max_tokens: settings.max_tokens,
            http: build_client(settings)?,
            queries: InFlightQueries::new(),
        })
    }

    /// Prompt-format markers and our own content tags.
    pub(crate) fn sanitize_pattern() -> &'static Regex {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            Regex::new(r"\[/?INST\]|<</?SYS>>|</?s>|</?(page|transcript|question)>")
                .expect("valid sanitize regex")
        })
    }

    pub(crate) fn request(&self) -> reqwest::RequestBuilder {
        let builder = self
            .http
            .post(&self.api_url)
            .header("content-type", "application/json");
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    pub(crate) fn build_request_body(&self, prompt: String, stream: bool) -> serde_json::Value {
        self.body_with_temperature(prompt, stream, ANSWER_TEMPERATURE)
    }

    pub(crate) fn body_with_temperature(
        &self,
        prompt: String,
        stream: bool,
        temperature: f32,
    ) -> serde_json::Value {
        serde_json::json!({
            "model": self.model.name,
            "prompt": prompt,
            "n_predict": self.max_tokens,
            "temperature": temperature,
            "stop": STOP_SEQUENCES,
            "stream": stream,
        })
    }

    /// Completion text of a non-streaming response.
    pub(crate) fn parse_response_text(json: &serde_json::Value) -> Result<String, AiError> {
        if let Some(message) = error_message(json) {
            return Err(AiError::ApiError(message));
        }
        json["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| AiError::ParseError("no content in completion".into()))
    }
}

/// llama.cpp reports failures as `{"error": {"message": ...}}` or a bare string.
pub(crate) fn error_message(json: &serde_json::Value) -> Option<String> {
    let error = json.get("error")?;
    Some(
        error["message"]
            .as_str()
            .or_else(|| error.as_str())
            .unwrap_or("completion failed")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::model_by_key;

    fn engine() -> LlamaRemote {
        LlamaRemote::new(
            model_by_key("chat-default").unwrap().clone(),
            &EngineSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn body_carries_prompt_and_limits() {
        let body = engine().build_request_body("<s>[INST] hi [/INST]".into(), true);
        assert_eq!(body["prompt"], "<s>[INST] hi [/INST]");
        assert_eq!(body["n_predict"], 800);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stop"][0], "</s>");
        assert_eq!(body["model"], "llama-2-13b-chat");
    }

    #[test]
    fn parses_completion_content() {
        let json = serde_json::json!({ "content": " <question>Why?</question>\n", "stop": true });
        assert_eq!(
            LlamaRemote::parse_response_text(&json).unwrap(),
            "<question>Why?</question>"
        );
    }

    #[test]
    fn error_body_is_api_error() {
        let json = serde_json::json!({ "error": { "code": 500, "message": "model not loaded" } });
        match LlamaRemote::parse_response_text(&json) {
            Err(AiError::ApiError(msg)) => assert_eq!(msg, "model not loaded"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_content_is_parse_error() {
        let json = serde_json::json!({ "tokens_predicted": 0 });
        assert!(matches!(
            LlamaRemote::parse_response_text(&json),
            Err(AiError::ParseError(_))
        ));
    }
}
