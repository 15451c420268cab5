//! Tool definition types.

use serde::{Deserialize, Serialize};

/// What the model is offered: a name, a description and a JSON schema for
/// the arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

impl From<&crate::mcp::McpToolDefinition> for ToolDefinition {
    fn from(tool: &crate::mcp::McpToolDefinition) -> Self {
        let input_schema = if tool.input_schema.is_object() {
            tool.input_schema.clone()
        } else {
            serde_json::json!({"type": "object", "properties": {}})
        };
        Self::new(&tool.name, &tool.description, input_schema)
    }
}
