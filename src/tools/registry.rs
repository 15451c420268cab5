//! Ordered, name-unique set of tools.

use std::collections::HashMap;
use std::sync::Arc;

use super::Tool;
use crate::types::ToolDefinition;
use crate::{Error, Result};

/// Registry of tools, iterated in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool; names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::config(format!("Duplicate tool name: {}", name)));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FunctionTool;
    use crate::types::ToolResult;

    fn echo(name: &str) -> Arc<dyn Tool> {
        Arc::new(FunctionTool::new(
            name,
            "echo",
            serde_json::json!({"type": "object", "properties": {}}),
            |input, _ctx| async move { ToolResult::success(input.to_string()) },
        ))
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("b")).unwrap();
        registry.register(echo("a")).unwrap();
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.definitions()[1].name, "a");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("same")).unwrap();
        let err = registry.register(echo("same")).unwrap_err();
        assert!(err.to_string().contains("Duplicate tool name"));
        assert_eq!(registry.len(), 1);
    }
}
