//! Ready-made agents.
//!
//! Each agent is a codec implementing [`RegisteredAgent`](crate::RegisteredAgent),
//! so it can be built directly with `build(&context)` or registered with an
//! [`OrchestratorAgent`](crate::OrchestratorAgent).

mod file_reader;
mod guard_rail;
mod mcp_time;
mod time;
mod translator;

pub use file_reader::{
    FileInput, FileOperation, FileOutput, FileReaderAgent, ReadFileContentInput,
    ReadFileContentTool,
};
pub use guard_rail::{ContentSafetyOutput, GuardRailAgent, RiskLevel};
pub use mcp_time::{MCP_TIME_SERVER, McpTimeAgent};
pub use time::{GetCurrentTimeTool, TimeAgent, TimeOutput};
pub use translator::{TranslationInput, TranslatorAgent};

/// Slice from the first `{` to the last `}`, for answers that wrap JSON in
/// prose or code fences.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
