//! Tools offered to the model: the [`Tool`] trait, typed [`SchemaTool`]s,
//! closure-backed [`FunctionTool`]s, the completion signal and wrappers for
//! tools served by external providers.

mod complete;
mod context;
mod function;
mod mcp;
mod registry;
mod traits;

pub use complete::{COMPLETION_TOOL_NAME, TaskCompleteInput, TaskCompleteTool};
pub use context::ExecutionContext;
pub use function::FunctionTool;
pub use mcp::ProviderTool;
pub use registry::ToolRegistry;
pub use traits::{SchemaTool, Tool, object_schema};

pub use crate::types::{ToolError, ToolOutput, ToolResult};
