//! The two tool seams: dynamic [`Tool`] and typed [`SchemaTool`].

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::context::ExecutionContext;
use crate::types::{ToolDefinition, ToolResult};

/// A callable the model can invoke by name.
///
/// Failures a model can react to are returned as [`ToolResult::error`]; the
/// execution loop feeds them back as the tool message text.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, input: Value, context: &ExecutionContext) -> ToolResult;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// A tool with a typed argument struct.
///
/// Every `SchemaTool` is a [`Tool`]: arguments are deserialized into
/// `Input` before [`handle`](SchemaTool::handle) runs, and a mismatch is
/// reported to the model as invalid input.
#[async_trait]
pub trait SchemaTool: Send + Sync {
    type Input: JsonSchema + DeserializeOwned + Send;
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    async fn handle(&self, input: Self::Input, context: &ExecutionContext) -> ToolResult;

    fn input_schema() -> Value {
        object_schema::<Self::Input>()
    }
}

/// JSON schema for `T` in the shape chat endpoints accept for function
/// parameters: an object with `properties`, without `$schema` or `title`.
pub fn object_schema<T: JsonSchema>() -> Value {
    let mut schema = match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    schema.remove("$schema");
    schema.remove("title");
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".into()));
    schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    Value::Object(schema)
}

#[async_trait]
impl<T: SchemaTool + 'static> Tool for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn description(&self) -> &str {
        T::DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        T::input_schema()
    }

    async fn execute(&self, input: Value, context: &ExecutionContext) -> ToolResult {
        match serde_json::from_value::<T::Input>(input) {
            Ok(typed) => self.handle(typed, context).await,
            Err(e) => ToolResult::invalid_input(e.to_string()),
        }
    }
}
