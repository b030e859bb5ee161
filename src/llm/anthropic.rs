//! Anthropic API client
//!
//! Production `LlmClient` over the Anthropic Messages API. The engine keeps
//! the full conversation (including tool_use and tool_result blocks) in the
//! request, so this client is a stateless request/response mapper.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::OracleConfig;
use crate::llm::client::{LlmClient, LlmError};
use crate::llm::types::{CompletionRequest, CompletionResponse, StopReason, ToolCall, Usage};

/// Anthropic API base URL
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Environment variable holding the oracle API key
pub const ORACLE_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: OracleConfig,
    usage: Arc<Mutex<Usage>>,
}

impl AnthropicClient {
    /// Create a new client, reading the API key from the environment
    pub fn new(config: OracleConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(ORACLE_KEY_ENV).map_err(|_| LlmError::MissingApiKey {
            env_var: ORACLE_KEY_ENV.to_string(),
        })?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OracleConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request(&self, request: &CompletionRequest) -> Value {
        let model = request.model.as_ref().unwrap_or(&self.config.model).clone();
        let max_tokens = request.max_tokens.unwrap_or(self.config.max_tokens);

        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "role": m.role,
                    "content": m.content
                })
            })
            .collect();

        let mut body = json!({
            "model": model,
            "max_tokens": max_tokens,
            "messages": messages
        });

        if !request.system.is_empty() {
            body["system"] = json!(request.system);
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request.tools.iter().map(|t| t.to_anthropic_schema()).collect();
            body["tools"] = json!(tools);
        }

        body
    }

    /// Parse the API response into a CompletionResponse
    fn parse_response(&self, body: Value) -> Result<CompletionResponse, LlmError> {
        let stop_reason = match body["stop_reason"].as_str() {
            Some("end_turn") => StopReason::EndTurn,
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        let usage = if let Some(u) = body.get("usage") {
            Usage::new(
                u["input_tokens"].as_u64().unwrap_or(0),
                u["output_tokens"].as_u64().unwrap_or(0),
            )
        } else {
            Usage::default()
        };

        {
            let mut total = self.usage.lock().unwrap();
            total.add(&usage);
        }

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        let blocks = body["content"]
            .as_array()
            .ok_or_else(|| LlmError::InvalidResponse("missing content array".to_string()))?;

        for block in blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str() {
                        if !content.is_empty() {
                            content.push('\n');
                        }
                        content.push_str(text);
                    }
                }
                Some("tool_use") => {
                    let id = block["id"].as_str().unwrap_or("").to_string();
                    let name = block["name"].as_str().unwrap_or("").to_string();
                    tool_calls.push(ToolCall::new(id, name, block["input"].clone()));
                }
                _ => {}
            }
        }

        Ok(CompletionResponse {
            content,
            tool_calls,
            stop_reason,
            usage,
        })
    }

    async fn send_request(&self, body: Value) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(LlmError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// Cumulative token usage across all completions
    pub fn total_usage(&self) -> Usage {
        *self.usage.lock().unwrap()
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.build_request(&request);
        log::debug!("oracle request: model={} messages={}", body["model"], request.messages.len());
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the API key
        f.debug_struct("AnthropicClient")
            .field("model", &self.config.model)
            .field("max_tokens", &self.config.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::{ContentBlock, Message, ToolDefinition, ToolResult};

    fn test_client() -> AnthropicClient {
        AnthropicClient::with_api_key("test-key".to_string(), OracleConfig::default()).unwrap()
    }

    #[test]
    fn test_build_request_basic() {
        let client = test_client();
        let request = CompletionRequest::new("You are a data catalog expert").with_message(Message::user("Hello"));

        let body = client.build_request(&request);

        assert_eq!(body["model"], OracleConfig::default().model);
        assert_eq!(body["system"], "You are a data catalog expert");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_build_request_with_tools() {
        let client = test_client();
        let tool = ToolDefinition::new(
            "list_tables",
            "List tables in a schema",
            json!({
                "type": "object",
                "properties": {
                    "data_source_id": { "type": "integer" },
                    "schema_name": { "type": "string" }
                },
                "required": ["data_source_id", "schema_name"]
            }),
        );

        let request = CompletionRequest::new("sys")
            .with_message(Message::user("What tables are in analytics?"))
            .with_tools(vec![tool]);

        let body = client.build_request(&request);
        assert!(body["tools"].is_array());
        assert_eq!(body["tools"][0]["name"], "list_tables");
    }

    #[test]
    fn test_build_request_serializes_block_messages() {
        let client = test_client();
        let request = CompletionRequest::new("sys")
            .with_message(Message::user("q"))
            .with_message(Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: "toolu_1".to_string(),
                name: "list_data_sources".to_string(),
                input: json!({}),
            }]))
            .with_message(Message::tool_results(vec![ToolResult::success("toolu_1", "[]")]));

        let body = client.build_request(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["content"][0]["type"], "tool_use");
        assert_eq!(messages[2]["content"][0]["type"], "tool_result");
        assert_eq!(messages[2]["content"][0]["tool_use_id"], "toolu_1");
    }

    #[test]
    fn test_parse_response_text_only() {
        let client = test_client();
        let response = client
            .parse_response(json!({
                "content": [{ "type": "text", "text": "The customers table lives in analytics." }],
                "stop_reason": "end_turn",
                "usage": { "input_tokens": 10, "output_tokens": 5 }
            }))
            .unwrap();

        assert_eq!(response.content, "The customers table lives in analytics.");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.total(), 15);
    }

    #[test]
    fn test_parse_response_with_tool_use() {
        let client = test_client();
        let response = client
            .parse_response(json!({
                "content": [
                    { "type": "text", "text": "Checking the catalog" },
                    {
                        "type": "tool_use",
                        "id": "toolu_123",
                        "name": "list_schemas",
                        "input": { "data_source_id": 59 }
                    }
                ],
                "stop_reason": "tool_use",
                "usage": { "input_tokens": 50, "output_tokens": 30 }
            }))
            .unwrap();

        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "list_schemas");
        assert_eq!(response.tool_calls[0].input["data_source_id"], 59);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
    }

    #[test]
    fn test_parse_response_missing_content_is_invalid() {
        let client = test_client();
        let err = client
            .parse_response(json!({ "stop_reason": "end_turn" }))
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_total_usage_accumulation() {
        let client = test_client();
        let _ = client.parse_response(json!({
            "content": [],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 100, "output_tokens": 50 }
        }));
        let _ = client.parse_response(json!({
            "content": [],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 200, "output_tokens": 100 }
        }));

        let total = client.total_usage();
        assert_eq!(total.input_tokens, 300);
        assert_eq!(total.output_tokens, 150);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = test_client();
        let debug = format!("{:?}", client);
        assert!(debug.contains("AnthropicClient"));
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnthropicClient>();
    }
}
