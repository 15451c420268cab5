//! Execution metadata: timing and the ordered conversation history of one run.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    LlmResponse,
    ToolCall,
    ToolResult,
}

/// One entry of the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationStep {
    pub kind: StepKind,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Set on tool results that report a failed call.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ConversationStep {
    pub(crate) fn llm_response(text: impl Into<String>) -> Self {
        Self {
            kind: StepKind::LlmResponse,
            timestamp: Utc::now(),
            content: text.into(),
            tool_name: None,
            arguments: None,
            result: None,
            is_error: false,
        }
    }

    pub(crate) fn tool_call(name: &str, arguments: Value) -> Self {
        Self {
            kind: StepKind::ToolCall,
            timestamp: Utc::now(),
            content: format!("Calling {}", name),
            tool_name: Some(name.to_string()),
            arguments: Some(arguments),
            result: None,
            is_error: false,
        }
    }

    pub(crate) fn tool_result(name: &str, result: impl Into<String>) -> Self {
        let result = result.into();
        Self {
            kind: StepKind::ToolResult,
            timestamp: Utc::now(),
            content: result.clone(),
            tool_name: Some(name.to_string()),
            arguments: None,
            result: Some(result),
            is_error: false,
        }
    }

    pub(crate) fn tool_failure(name: &str, result: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::tool_result(name, result)
        }
    }
}

/// Why the execution loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The model called the completion tool.
    CompletionTool,
    /// Two consecutive turns without tool calls.
    QuietTurns,
    /// The turn budget ran out.
    TurnBudget,
}

/// Timing and history of one execution, owned by the output it describes.
///
/// Steps are appended only by the execution loop and never modified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub agent_name: String,
    pub turns: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
    #[serde(default)]
    steps: Vec<ConversationStep>,
}

impl ExecutionMetadata {
    pub fn started(agent_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            agent_name: agent_name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn record(&mut self, step: ConversationStep) {
        self.steps.push(step);
    }

    pub(crate) fn finish(&mut self) {
        self.end_time = Utc::now();
    }

    pub fn steps(&self) -> &[ConversationStep] {
        &self.steps
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// Result text of the most recent call to `tool_name`.
    pub fn find_tool_result(&self, tool_name: &str) -> Option<&str> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::ToolResult && s.tool_name.as_deref() == Some(tool_name))
            .and_then(|s| s.result.as_deref())
    }

    /// Most recent result of a real tool call, skipping the completion tool.
    pub fn last_tool_result(&self) -> Option<&ConversationStep> {
        self.steps.iter().rev().find(|s| {
            s.kind == StepKind::ToolResult
                && s.tool_name.as_deref() != Some(crate::tools::COMPLETION_TOOL_NAME)
        })
    }

    pub fn first_llm_response(&self) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.kind == StepKind::LlmResponse)
            .map(|s| s.content.as_str())
    }

    pub fn tool_call_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.kind == StepKind::ToolCall)
            .count()
    }
}
