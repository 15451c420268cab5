use crate::agent::{AgentBuilder, AgentCodec, ExecutionMetadata, TextInput, TextOutput};
use crate::orchestration::RegisteredAgent;

/// Name under which the time server must appear in the context's MCP
/// server table.
pub const MCP_TIME_SERVER: &str = "time";

/// Time agent whose tools come from an external MCP time server.
#[derive(Debug, Default, Clone, Copy)]
pub struct McpTimeAgent;

impl AgentCodec for McpTimeAgent {
    type Input = TextInput;
    type Output = TextOutput;

    /// The last time-tool result decides success. Without one, only the
    /// answer text is left to judge.
    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> TextOutput {
        let error_message = match metadata.last_tool_result() {
            Some(step) if step.is_error => Some(step.content.clone()),
            Some(_) => None,
            None if final_text.contains("Error") || final_text.contains("Failed") => {
                Some(final_text.clone())
            }
            None => None,
        };
        TextOutput {
            success: error_message.is_none(),
            error_message,
            ..TextOutput::completed(final_text, metadata)
        }
    }
}

impl RegisteredAgent for McpTimeAgent {
    const NAME: &'static str = "McpTimeAgent";
    const SPECIALTY: &'static str = "Time and date queries using an MCP time server";
    const GOAL: &'static str = "You are a time and date specialist with access to time tools.
You can:
- Get the current time in various timezones
- Provide date and time information
- Handle timezone conversions
- Answer time-related queries in French or English

Use the available time tools to complete user requests.";
    const KEYWORDS: &'static [&'static str] = &[
        "time", "heure", "date", "hour", "minute", "fuseau", "timezone", "horaire", "when",
        "maintenant", "now", "aujourd'hui", "today",
    ];

    fn configure(builder: AgentBuilder) -> AgentBuilder {
        builder.configured_mcp_server(MCP_TIME_SERVER)
    }
}
