//! Prelude module for convenient imports.
//!
//! ```rust
//! use monia_agent::prelude::*;
//! ```

// Core types
pub use crate::Error;
pub use crate::Result;
pub use crate::{
    Agent, AgentBuilder, AgentCodec, AgentContext, AgentInput, AgentOutput, DynAgent,
    ExecutionMetadata, TextInput, TextOutput,
};

// Gateway
pub use crate::{ChatGateway, ModelConfig, OpenAiGateway};

// Tools
pub use crate::tools::{ExecutionContext, FunctionTool, SchemaTool, Tool, ToolRegistry};
pub use crate::types::ToolResult;

// Composition
pub use crate::orchestration::{AgentRegistry, OrchestratorAgent, RegisteredAgent};
pub use crate::workflow::{StepConfig, WorkflowBuilder, WorkflowExecutionResult};

// Configuration
pub use crate::config::{Settings, SettingsLoader};

pub use tokio_util::sync::CancellationToken;
