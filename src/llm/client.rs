//! Oracle client abstraction
//!
//! The engine drives the tool loop through the `LlmClient` trait. The
//! production implementation lives in `anthropic`; `MockLlmClient` scripts
//! completions for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{CompletionRequest, CompletionResponse};

/// Errors from the reasoning oracle
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("rate limited, retry after {retry_after:?} seconds")]
    RateLimited { retry_after: Option<u64> },

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing API key: set {env_var}")]
    MissingApiKey { env_var: String },
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::RateLimited { .. } => true,
            LlmError::Api { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            _ => false,
        }
    }
}

/// A client that can produce completions with tool use
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Request one completion for the given conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Model identifier used by this client
    fn model(&self) -> &str;
}

/// Scripted oracle for tests. Responses are consumed in order; the recorded
/// requests let tests assert on conversation shape and result ordering.
pub struct MockLlmClient {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    repeat_last: bool,
}

impl MockLlmClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            repeat_last: false,
        }
    }

    /// Replay the final scripted response forever once the queue drains.
    /// Used to exercise the turn budget.
    pub fn repeating(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            repeat_last: true,
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if self.repeat_last && responses.len() == 1 {
            return Ok(responses.front().cloned().unwrap_or_default());
        }
        responses
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("mock response queue exhausted".to_string()))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{Message, StopReason, ToolCall};
    use serde_json::json;

    #[test]
    fn test_error_retryability() {
        assert!(LlmError::RateLimited { retry_after: Some(5) }.is_retryable());
        assert!(
            LlmError::Api {
                status: 503,
                message: "overloaded".to_string()
            }
            .is_retryable()
        );
        assert!(
            !LlmError::Api {
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );
        assert!(!LlmError::InvalidResponse("garbage".to_string()).is_retryable());
    }

    #[tokio::test]
    async fn test_mock_client_consumes_in_order() {
        let mock = MockLlmClient::new(vec![
            CompletionResponse {
                content: "first".to_string(),
                ..Default::default()
            },
            CompletionResponse {
                content: "second".to_string(),
                ..Default::default()
            },
        ]);

        let request = CompletionRequest::new("sys").with_message(Message::user("q"));
        assert_eq!(mock.complete(request.clone()).await.unwrap().content, "first");
        assert_eq!(mock.complete(request.clone()).await.unwrap().content, "second");
        assert!(mock.complete(request).await.is_err());
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_repeating_mock_never_drains() {
        let mock = MockLlmClient::repeating(vec![CompletionResponse {
            tool_calls: vec![ToolCall::new("toolu_1", "list_data_sources", json!({}))],
            stop_reason: StopReason::ToolUse,
            ..Default::default()
        }]);

        for _ in 0..20 {
            let response = mock
                .complete(CompletionRequest::new("sys").with_message(Message::user("q")))
                .await
                .unwrap();
            assert_eq!(response.stop_reason, StopReason::ToolUse);
        }
    }
}
