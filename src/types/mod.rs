//! Core types shared by the gateway, the tools, and the execution loop.

mod message;
mod tool;

pub use message::{ChatMessage, Role, ToolCall};
pub use tool::{ToolDefinition, ToolError, ToolOutput, ToolResult};
