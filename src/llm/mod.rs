//! Reasoning oracle layer
//!
//! Wire types for tool-using conversations, the `LlmClient` seam, and the
//! Anthropic production client.

pub mod anthropic;
pub mod client;
pub mod types;

pub use anthropic::{AnthropicClient, ORACLE_KEY_ENV};
pub use client::{LlmClient, LlmError, MockLlmClient};
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason,
    ToolCall, ToolDefinition, ToolResult, Usage,
};
