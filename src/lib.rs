//! # monia-agent
//!
//! Typed, tool-calling agents over any OpenAI-compatible chat endpoint.
//!
//! Each agent drives a bounded multi-turn conversation, dispatching tool calls to
//! local tools or to external MCP tool providers, and converts the result into a
//! typed output. Agents compose either statically through a [`Workflow`] or
//! dynamically through the [`OrchestratorAgent`], which lets the model discover
//! and run registered agents, optionally in parallel.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use monia_agent::{AgentContext, ModelConfig, OpenAiGateway, RegisteredAgent, TextInput};
//! use monia_agent::agents::TimeAgent;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), monia_agent::Error> {
//!     let model = ModelConfig::new("sk-...", "https://api.openai.com/v1", "gpt-4o-mini");
//!     let context = AgentContext::new(Arc::new(OpenAiGateway::new(model)?));
//!
//!     let agent = TimeAgent::build(&context).await?;
//!     let output = agent.execute(TextInput::new("What time is it?"), Default::default()).await;
//!     println!("{}", output.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Workflows
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use monia_agent::{AgentContext, RegisteredAgent, TextInput, WorkflowBuilder};
//! use monia_agent::agents::{FileInput, FileReaderAgent, GuardRailAgent};
//!
//! # async fn example(context: AgentContext) -> Result<(), monia_agent::Error> {
//! let workflow = WorkflowBuilder::new()
//!     .with_name("read-then-check")
//!     .register_agent(Arc::new(FileReaderAgent::build(&context).await?))
//!     .register_agent(Arc::new(GuardRailAgent::build(&context).await?))
//!     .add_step("FileReaderAgent", |step| step)
//!     .add_step("GuardRailAgent", |step| {
//!         step.max_retries(2).transform(|previous| {
//!             TextInput::new(previous.map(|output| output.content()).unwrap_or_default())
//!         })
//!     })
//!     .build()?;
//!
//! let result = workflow
//!     .execute(&FileInput::read("notes.txt"), Default::default())
//!     .await;
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod agent;
pub mod agents;
pub mod client;
pub mod config;
pub mod mcp;
pub mod observability;
pub mod orchestration;
pub mod prelude;
pub mod tools;
pub mod types;
pub mod workflow;

pub use agent::{
    Agent, AgentBuilder, AgentCodec, AgentContext, AgentInput, AgentOutput, AgentRuntime,
    ConversationStep, DynAgent, ExecutionMetadata, ProviderWarning, RunOutcome, StepKind,
    TerminationReason, TextCodec, TextInput, TextOutput,
};
pub use client::{ChatGateway, ChatRequest, ChatResponse, FinishReason, ModelConfig, OpenAiGateway};
pub use config::{ConfigBuilder, ConfigProvider, ConfigProviderExt, Settings, SettingsLoader};
pub use mcp::{
    McpClient, McpContent, McpError, McpResult, McpServerConfig, McpToolDefinition,
    McpToolResult, ToolProvider,
};
pub use observability::SpanContext;
pub use orchestration::{AgentRegistration, AgentRegistry, OrchestratorAgent, RegisteredAgent};
pub use tools::{
    COMPLETION_TOOL_NAME, ExecutionContext, FunctionTool, SchemaTool, TaskCompleteTool, Tool,
    ToolRegistry,
};
pub use types::{ChatMessage, Role, ToolCall, ToolDefinition, ToolError, ToolOutput, ToolResult};
pub use workflow::{
    StepConfig, StepExecutionResult, Workflow, WorkflowBuilder, WorkflowContext,
    WorkflowExecutionResult,
};

/// Error type for monia-agent operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Chat endpoint returned an error response.
    #[error("API error (HTTP {status}): {message}", status = status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()))]
    Api {
        message: String,
        status: Option<u16>,
    },

    /// The chat gateway failed while an agent was running.
    #[error("Error communicating with API: {source}")]
    Gateway {
        agent: String,
        #[source]
        source: Box<Error>,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tool execution failed.
    #[error("Tool execution failed: {0}")]
    Tool(#[from] types::ToolError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or invalid.
    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    /// MCP server communication failed.
    #[error("MCP error: {0}")]
    Mcp(String),

    /// No agent is registered under the requested name.
    #[error("Agent '{name}' not found")]
    AgentNotFound { name: String },

    /// Execution was cancelled through its cancellation token.
    #[error("Execution cancelled")]
    Cancelled,
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Settings, agent definitions or unparseable payloads; retrying the same
    /// call cannot help.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Config(_) | Error::Parse(_) | Error::Env(_) | Error::AgentNotFound { .. } => {
                true
            }
            Error::Gateway { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }

    /// Network failures, rate limits and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api {
                status: Some(429 | 500..=599),
                ..
            } => true,
            Error::Gateway { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Gateway { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => *status,
            Error::Gateway { source, .. } => source.status_code(),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound { key } => {
                Error::Config(format!("Key not found: {}", key))
            }
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Env(e),
            config::ConfigError::Provider { message } => Error::Config(message),
        }
    }
}

impl From<mcp::McpError> for Error {
    fn from(err: mcp::McpError) -> Self {
        Error::Mcp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
