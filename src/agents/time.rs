use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentCodec, AgentOutput, ExecutionMetadata, TextInput};
use crate::orchestration::RegisteredAgent;
use crate::tools::{ExecutionContext, SchemaTool, Tool};
use crate::types::ToolResult;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub content: String,
    pub current_time: Option<DateTime<FixedOffset>>,
    pub formatted_time: String,
    pub metadata: ExecutionMetadata,
}

impl AgentOutput for TimeOutput {
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
            metadata,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TimeReading {
    current_time: DateTime<FixedOffset>,
    formatted_time: String,
    content: String,
}

impl TimeReading {
    fn at(now: DateTime<FixedOffset>) -> Self {
        let formatted_time = now.format("%Y-%m-%d %H:%M:%S %:z").to_string();
        Self {
            current_time: now,
            content: format!("Current time: {}", formatted_time),
            formatted_time,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetCurrentTimeInput {}

#[derive(Debug, Default, Clone, Copy)]
pub struct GetCurrentTimeTool;

#[async_trait]
impl SchemaTool for GetCurrentTimeTool {
    type Input = GetCurrentTimeInput;
    const NAME: &'static str = "get_current_time";
    const DESCRIPTION: &'static str = "Return the current time in the system timezone";

    async fn handle(&self, _input: GetCurrentTimeInput, _context: &ExecutionContext) -> ToolResult {
        ToolResult::structured(&TimeReading::at(Local::now().fixed_offset()))
    }
}

/// Answers time questions from the `get_current_time` tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeAgent;

impl AgentCodec for TimeAgent {
    type Input = TextInput;
    type Output = TimeOutput;

    /// The tool's reading wins over whatever the model wrote.
    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> TimeOutput {
        let reading = metadata
            .find_tool_result(GetCurrentTimeTool::NAME)
            .and_then(|raw| serde_json::from_str::<TimeReading>(raw).ok());

        match reading {
            Some(reading) => TimeOutput {
                success: true,
                error_message: None,
                content: reading.content,
                current_time: Some(reading.current_time),
                formatted_time: reading.formatted_time,
                metadata,
            },
            None => TimeOutput {
                content: final_text,
                ..TimeOutput::failure("No time result found".into(), metadata)
            },
        }
    }
}

impl RegisteredAgent for TimeAgent {
    const NAME: &'static str = "TimeAgent";
    const SPECIALTY: &'static str = "Time and scheduling queries";
    const GOAL: &'static str = "You are a time specialist assistant. You help users with \
        time-related queries, timezone conversions, and scheduling. Always use the \
        get_current_time tool when users ask about the current time.";
    const KEYWORDS: &'static [&'static str] = &[
        "time", "date", "when", "schedule", "timezone", "clock", "now", "today", "tomorrow",
        "yesterday",
    ];

    fn tools() -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(GetCurrentTimeTool)]
    }
}
