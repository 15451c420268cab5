//! Adapter exposing a tool served by a [`ToolProvider`] through the
//! [`Tool`] trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{ExecutionContext, Tool};
use crate::mcp::{McpToolDefinition, ToolProvider};
use crate::types::{ToolDefinition, ToolError, ToolResult};

pub struct ProviderTool {
    provider: Arc<dyn ToolProvider>,
    definition: McpToolDefinition,
}

impl ProviderTool {
    pub fn new(provider: Arc<dyn ToolProvider>, definition: McpToolDefinition) -> Self {
        Self {
            provider,
            definition,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

#[async_trait]
impl Tool for ProviderTool {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        &self.definition.description
    }

    fn input_schema(&self) -> Value {
        self.definition.input_schema.clone()
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::from(&self.definition)
    }

    async fn execute(&self, input: Value, context: &ExecutionContext) -> ToolResult {
        if context.is_cancelled() {
            return ToolError::Cancelled.into();
        }
        match self.provider.call_tool(&self.definition.name, input).await {
            Ok(result) if result.is_error => ToolResult::error(result.joined_text()),
            Ok(result) => ToolResult::success(result.joined_text()),
            Err(e) => ToolError::provider(self.provider.name(), e.to_string()).into(),
        }
    }
}

impl std::fmt::Debug for ProviderTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderTool")
            .field("provider", &self.provider.name())
            .field("tool", &self.definition.name)
            .finish()
    }
}
