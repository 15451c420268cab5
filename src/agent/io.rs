//! Agent input and output contracts.

use std::any::Any;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::ExecutionMetadata;

/// Anything an agent can be asked to work on.
pub trait AgentInput: Any + Send + Sync {
    /// Prompt text sent to the model.
    fn to_prompt(&self) -> String;
}

impl dyn AgentInput {
    pub fn downcast_ref<T: AgentInput>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Pretty-printed JSON, the default prompt form for structured inputs.
pub fn structured_prompt<T: Serialize>(input: &T) -> String {
    serde_json::to_string_pretty(input).unwrap_or_default()
}

/// Result of one agent execution.
pub trait AgentOutput: Any + Send + Sync + Debug {
    fn success(&self) -> bool;
    fn error_message(&self) -> Option<&str>;
    fn content(&self) -> &str;
    fn metadata(&self) -> &ExecutionMetadata;

    /// Output for a run that never produced a final text.
    fn failure(message: String, metadata: ExecutionMetadata) -> Self
    where
        Self: Sized;
}

impl dyn AgentOutput {
    pub fn downcast_ref<T: AgentOutput>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Free-form text input, sent to the model verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl AgentInput for TextInput {
    fn to_prompt(&self) -> String {
        self.text.clone()
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        Self { text }
    }
}

/// Plain text answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub content: String,
    pub metadata: ExecutionMetadata,
}

impl TextOutput {
    pub fn completed(content: impl Into<String>, metadata: ExecutionMetadata) -> Self {
        Self {
            success: true,
            error_message: None,
            content: content.into(),
            metadata,
        }
    }
}

impl AgentOutput for TextOutput {
    fn success(&self) -> bool {
        self.success
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn metadata(&self) -> &ExecutionMetadata {
        &self.metadata
    }

    fn failure(message: String, metadata: ExecutionMetadata) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            content: String::new(),
            metadata,
        }
    }
}
