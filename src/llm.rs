//! LLM provider abstraction
//!
//! The hosted model is an opaque collaborator: a chat is started from a
//! prior history and each `send` yields one reply.

mod error;
mod gemini;
#[cfg(test)]
pub mod testing;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// A conversation seeded with prior history
pub struct ChatHandle {
    service: Arc<dyn LlmService>,
    history: Vec<LlmMessage>,
}

/// Start a chat whose context is `history`
pub fn start_chat(service: Arc<dyn LlmService>, history: Vec<LlmMessage>) -> ChatHandle {
    ChatHandle { service, history }
}

impl ChatHandle {
    /// Send `text` as the next user message and return the model's reply
    pub async fn send(
        &self,
        text: &str,
        params: GenerationParams,
    ) -> Result<LlmResponse, LlmError> {
        let mut messages = self.history.clone();
        messages.push(LlmMessage::user(text));
        let request = LlmRequest { messages, params };
        self.service.complete(&request).await
    }
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = request.messages.len(),
                    temperature = request.params.temperature(),
                    max_output_tokens = request.params.max_output_tokens(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockLlmService;
    use super::*;

    #[tokio::test]
    async fn test_chat_sends_history_then_text() {
        let mock = Arc::new(MockLlmService::new("mock"));
        mock.queue_text("pong");

        let chat = start_chat(
            mock.clone(),
            vec![LlmMessage::user("first"), LlmMessage::assistant("reply")],
        );
        let params = GenerationParams::new(0.2, 100).unwrap();
        let response = chat.send("ping", params).await.unwrap();

        assert_eq!(response.text, "pong");
        let requests = mock.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].messages,
            vec![
                LlmMessage::user("first"),
                LlmMessage::assistant("reply"),
                LlmMessage::user("ping"),
            ]
        );
        assert_eq!(requests[0].params, params);
    }

    #[tokio::test]
    async fn test_logging_service_passes_through() {
        let mock = Arc::new(MockLlmService::new("mock-model"));
        mock.queue_error(LlmError::auth("bad key"));
        let logged = LoggingService::new(mock);

        assert_eq!(logged.model_id(), "mock-model");
        let request = LlmRequest {
            messages: vec![LlmMessage::user("hi")],
            params: GenerationParams::default(),
        };
        let err = logged.complete(&request).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
    }
}
