//! Chat gateway: the request/response boundary to the language model.
//!
//! The execution loop only ever talks to a [`ChatGateway`]. [`OpenAiGateway`]
//! is the shipped implementation for OpenAI-compatible `chat/completions`
//! endpoints; tests use a scripted gateway instead.

mod config;
mod openai;

pub use config::ModelConfig;
pub use openai::OpenAiGateway;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{ChatMessage, ToolCall, ToolDefinition};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Why the model stopped producing output for this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Text,
    ToolCalls,
}

/// One turn's worth of input: the system goal, the full history and the
/// offered tools.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub finish_reason: FinishReason,
    pub messages: Vec<ChatMessage>,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            finish_reason: FinishReason::Text,
            messages: vec![ChatMessage::assistant(content)],
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            finish_reason: FinishReason::ToolCalls,
            messages: vec![ChatMessage::assistant_tool_calls("", calls.clone())],
            tool_calls: calls,
        }
    }

    pub fn wants_tool_use(&self) -> bool {
        self.finish_reason == FinishReason::ToolCalls && !self.tool_calls.is_empty()
    }

    /// Text of the last message, empty when the model said nothing.
    pub fn last_text(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    fn model(&self) -> &str;

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse>;
}
