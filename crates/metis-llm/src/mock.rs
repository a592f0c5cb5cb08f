//! Mock LLM Provider for testing
//!
//! Returns queued responses, or delegates to a responder closure so tests
//! can key canned output off the prompt (the fan-out runs agents
//! concurrently, so queue order alone is not deterministic per agent).

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;
use crate::provider::LlmProvider;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Responder closure type: maps a request to a canned result
type Responder = dyn Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync;

/// A mock LLM provider that returns queued or computed responses.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<CompletionResponse>>>>,
    responder: Option<Arc<Responder>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            responder: None,
        }
    }

    /// Create a mock whose responses are computed from the request.
    #[must_use]
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<CompletionResponse> + Send + Sync + 'static,
    {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            responder: Some(Arc::new(responder)),
        }
    }

    /// Queue a raw text response.
    pub fn add_response(&self, content: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(text_response(content)));
    }

    /// Queue an error result.
    pub fn add_error(&self, error: crate::error::Error) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }
}

/// Build a plain text mock response
#[must_use]
pub fn text_response(content: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        content: content.into(),
        usage: None,
        model: "mock-model".to_string(),
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn available_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        if let Some(responder) = &self.responder {
            return responder(&request);
        }

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(result) = responses.pop_front() {
            result
        } else {
            // Default behavior if queue empty
            Ok(text_response("{}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_queued_responses_in_order() {
        let mock = MockProvider::new();
        mock.add_response("first");
        mock.add_error(Error::RateLimit);

        let first = mock.complete(CompletionRequest::new("a")).await.unwrap();
        assert_eq!(first.content, "first");

        let second = mock.complete(CompletionRequest::new("b")).await;
        assert!(matches!(second, Err(Error::RateLimit)));

        // Queue drained: default empty-object response
        let third = mock.complete(CompletionRequest::new("c")).await.unwrap();
        assert_eq!(third.content, "{}");
    }

    #[tokio::test]
    async fn test_responder_sees_prompt() {
        let mock = MockProvider::with_responder(|req| {
            if req.prompt.contains("architect") {
                Ok(text_response("{\"pattern\":\"microservices\"}"))
            } else {
                Ok(text_response("{}"))
            }
        });

        let response = mock
            .complete(CompletionRequest::new("you are an architect"))
            .await
            .unwrap();
        assert!(response.content.contains("microservices"));
    }
}
