//! EngineConsumer implementation for LlamaRemote.

use async_trait::async_trait;
use pagechat_common::{new_correlation_id, ConversationTurn};
use tracing::{debug, warn};

use crate::http::{check_status, map_send_error};
use crate::prompts::{parse_questions, question_request, strip_matches, system_prompt};
use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiError, ChunkCallback, EngineConsumer};

use super::client::{error_message, LlamaRemote, QUESTION_TEMPERATURE};
use super::prompt::build_prompt;

#[async_trait]
impl EngineConsumer for LlamaRemote {
    fn sanitize_input(&self, text: &mut String) {
        strip_matches(text, Self::sanitize_pattern());
    }

    async fn generate_question_suggestions(
        &self,
        is_video: bool,
        page_content: &str,
    ) -> Result<Vec<String>, AiError> {
        let prompt = build_prompt(
            &system_prompt(is_video, page_content),
            &[],
            &question_request(is_video),
        );
        let body = self.body_with_temperature(prompt, false, QUESTION_TEMPERATURE);
        let request_id = new_correlation_id();
        debug!(model = %self.model.name, %request_id, "Llama question request");

        let text = self
            .queries
            .run(async {
                let response = self.request().json(&body).send().await.map_err(map_send_error)?;
                let response = check_status(response).await?;
                let json: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| AiError::ParseError(e.to_string()))?;
                Self::parse_response_text(&json)
            })
            .await?;

        Ok(parse_questions(&text))
    }

    async fn generate_assistant_response(
        &self,
        is_video: bool,
        page_content: &str,
        history: &[ConversationTurn],
        human_input: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError> {
        let prompt = build_prompt(&system_prompt(is_video, page_content), history, human_input);
        let body = self.build_request_body(prompt, true);
        let request_id = new_correlation_id();
        debug!(model = %self.model.name, %request_id, turns = history.len(), "Llama streaming request");

        self.queries
            .run(async {
                let response = self.request().json(&body).send().await.map_err(map_send_error)?;
                let response = check_status(response).await?;

                let mut raw = String::new();
                let mut stopped = false;
                let mut failure: Option<AiError> = None;
                parse_sse_stream(response, |event| {
                    if stopped || failure.is_some() {
                        return;
                    }
                    match apply_stream_event(&event, &mut raw) {
                        Ok(step) => {
                            if step.appended {
                                on_chunk(raw.trim_start().to_string());
                            }
                            stopped = step.stop;
                        }
                        Err(e) => failure = Some(e),
                    }
                })
                .await?;

                if let Some(e) = failure {
                    warn!(%request_id, error = %e, "Llama stream failed");
                    return Err(e);
                }
                let full = raw.trim().to_string();
                debug!(%request_id, chars = full.len(), "Llama stream complete");
                Ok(full)
            })
            .await
    }

    fn clear_all_queries(&self) {
        self.queries.cancel_all();
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct StreamStep {
    pub appended: bool,
    pub stop: bool,
}

/// Fold one `data:` line into `raw`.
pub(crate) fn apply_stream_event(event: &SseEvent, raw: &mut String) -> Result<StreamStep, AiError> {
    let data: serde_json::Value =
        serde_json::from_str(&event.data).map_err(|e| AiError::ParseError(e.to_string()))?;
    if let Some(message) = error_message(&data) {
        return Err(AiError::ApiError(message));
    }

    let mut step = StreamStep {
        stop: data["stop"].as_bool().unwrap_or(false),
        ..StreamStep::default()
    };
    if let Some(content) = data["content"].as_str() {
        if !content.is_empty() {
            raw.push_str(content);
            step.appended = true;
        }
    }
    Ok(step)
}
