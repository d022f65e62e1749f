//! EngineConsumer implementation for ClaudeRemote (questions + streaming answers).

use async_trait::async_trait;
use pagechat_common::{new_correlation_id, ConversationTurn};
use tracing::{debug, warn};

use crate::http::{check_status, map_send_error};
use crate::prompts::{parse_questions, question_request, strip_matches, system_prompt};
use crate::streaming::{parse_sse_stream, SseEvent};
use crate::{AiError, ChunkCallback, EngineConsumer};

use super::client::ClaudeRemote;

#[async_trait]
impl EngineConsumer for ClaudeRemote {
    fn sanitize_input(&self, text: &mut String) {
        strip_matches(text, Self::sanitize_pattern());
    }

    async fn generate_question_suggestions(
        &self,
        is_video: bool,
        page_content: &str,
    ) -> Result<Vec<String>, AiError> {
        let body = self.build_request_body(
            system_prompt(is_video, page_content),
            &[],
            &question_request(is_video),
            false,
        );
        let request_id = new_correlation_id();
        debug!(model = %self.model.name, %request_id, "Claude question request");

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

        let questions = parse_questions(&text);
        debug!(%request_id, count = questions.len(), "Claude questions parsed");
        Ok(questions)
    }

    async fn generate_assistant_response(
        &self,
        is_video: bool,
        page_content: &str,
        history: &[ConversationTurn],
        human_input: &str,
        on_chunk: ChunkCallback,
    ) -> Result<String, AiError> {
        let body = self.build_request_body(
            system_prompt(is_video, page_content),
            history,
            human_input,
            true,
        );
        let request_id = new_correlation_id();
        debug!(model = %self.model.name, %request_id, turns = history.len(), "Claude streaming request");

        self.queries
            .run(async {
                let response = self.request().json(&body).send().await.map_err(map_send_error)?;
                let response = check_status(response).await?;

                let mut full = String::new();
                let mut failure: Option<AiError> = None;
                parse_sse_stream(response, |event| {
                    if failure.is_some() {
                        return;
                    }
                    match apply_stream_event(&event, &mut full) {
                        Ok(true) => on_chunk(full.clone()),
                        Ok(false) => {}
                        Err(e) => failure = Some(e),
                    }
                })
                .await?;

                if let Some(e) = failure {
                    warn!(%request_id, error = %e, "Claude stream failed");
                    return Err(e);
                }
                debug!(%request_id, chars = full.len(), "Claude stream complete");
                Ok(full)
            })
            .await
    }

    fn clear_all_queries(&self) {
        self.queries.cancel_all();
    }
}

/// Fold one stream event into `full`. Returns whether text was appended.
pub(crate) fn apply_stream_event(event: &SseEvent, full: &mut String) -> Result<bool, AiError> {
    match event.event.as_deref().unwrap_or("") {
        "content_block_delta" => {
            let data: serde_json::Value = serde_json::from_str(&event.data)
                .map_err(|e| AiError::ParseError(e.to_string()))?;
            if data["delta"]["type"] != "text_delta" {
                return Ok(false);
            }
            match data["delta"]["text"].as_str() {
                Some(text) if !text.is_empty() => {
                    full.push_str(text);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
        "error" => {
            let data: serde_json::Value = serde_json::from_str(&event.data).unwrap_or_default();
            let kind = data["error"]["type"].as_str().unwrap_or("");
            match kind {
                "overloaded_error" | "rate_limit_error" => Err(AiError::RateLimited),
                _ => {
                    let message = data["error"]["message"].as_str().unwrap_or(kind);
                    Err(AiError::ApiError(message.to_string()))
                }
            }
        }
        _ => Ok(false),
    }
}
