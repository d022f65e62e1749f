//! HTTP plumbing shared by the remote engines.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::factory::EngineSettings;
use crate::AiError;

/// Build the reqwest client used by a remote engine.
pub fn build_client(settings: &EngineSettings) -> Result<reqwest::Client, AiError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|e| AiError::NotConfigured(format!("failed to build HTTP client: {e}")))
}

pub fn map_send_error(e: reqwest::Error) -> AiError {
    if e.is_timeout() {
        AiError::Timeout
    } else {
        AiError::NetworkError(e.to_string())
    }
}

/// Turn non-success statuses into errors, keeping a short body excerpt.
pub async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(AiError::RateLimited);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let text = text.chars().take(200).collect::<String>();
        return Err(AiError::ApiError(format!("HTTP {status}: {text}")));
    }
    Ok(response)
}

/// Cancels every request started before the last [`cancel_all`](Self::cancel_all).
#[derive(Debug, Default)]
pub struct InFlightQueries {
    token: Mutex<CancellationToken>,
}

impl InFlightQueries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `request` until it finishes or the queries are cleared.
    pub async fn run<T, F>(&self, request: F) -> Result<T, AiError>
    where
        F: Future<Output = Result<T, AiError>>,
    {
        let token = self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        tokio::select! {
            _ = token.cancelled() => Err(AiError::Cancelled),
            result = request => result,
        }
    }

    pub fn cancel_all(&self) {
        let mut token = self.token.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn completed_request_passes_through() {
        let queries = InFlightQueries::new();
        let result = queries.run(async { Ok::<_, AiError>(5) }).await;
        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn cancel_all_aborts_pending_requests() {
        let queries = Arc::new(InFlightQueries::new());
        let runner = Arc::clone(&queries);
        let handle = tokio::spawn(async move {
            runner
                .run(async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, AiError>(())
                })
                .await
        });

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        queries.cancel_all();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AiError::Cancelled)));
    }

    #[tokio::test]
    async fn requests_after_cancel_run_normally() {
        let queries = InFlightQueries::new();
        queries.cancel_all();
        let result = queries.run(async { Ok::<_, AiError>("fresh") }).await;
        assert_eq!(result.unwrap(), "fresh");
    }
}
