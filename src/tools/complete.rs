//! The completion signal: a reserved tool that ends a run with an authored
//! final answer.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ExecutionContext, SchemaTool};
use crate::types::ToolResult;

pub const COMPLETION_TOOL_NAME: &str = "task_complete";

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaskCompleteInput {
    /// The final answer to return to the caller.
    #[serde(default)]
    pub final_answer: String,
}

impl TaskCompleteInput {
    /// Reads the answer from raw call arguments, tolerating a missing field.
    pub fn from_arguments(arguments: &serde_json::Value) -> Self {
        serde_json::from_value(arguments.clone()).unwrap_or_default()
    }
}

/// Added to every agent's tool set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskCompleteTool;

#[async_trait]
impl SchemaTool for TaskCompleteTool {
    type Input = TaskCompleteInput;
    const NAME: &'static str = COMPLETION_TOOL_NAME;
    const DESCRIPTION: &'static str = "Call this when the task is completed. \
        Pass the complete answer for the user as final_answer.";

    async fn handle(&self, input: TaskCompleteInput, _context: &ExecutionContext) -> ToolResult {
        ToolResult::success(input.final_answer)
    }
}
