//! Dynamic orchestration: a registry of agent types and an agent that
//! drives them through tool calls.
//!
//! ```rust,no_run
//! use monia_agent::{AgentContext, OrchestratorAgent, TextInput};
//! use monia_agent::agents::{FileReaderAgent, TranslatorAgent};
//!
//! # async fn example(context: AgentContext) -> Result<(), monia_agent::Error> {
//! let orchestrator = OrchestratorAgent::build(&context).await?;
//! orchestrator.register_agent::<FileReaderAgent>();
//! orchestrator.register_agent::<TranslatorAgent>();
//!
//! let output = orchestrator
//!     .execute(TextInput::new("Read notes.txt and translate it to French"), Default::default())
//!     .await;
//! println!("{}", output.content);
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod registration;
mod registry;
mod tools;

pub use orchestrator::{ORCHESTRATOR_GOAL, ORCHESTRATOR_NAME, OrchestratorAgent};
pub use registration::{AgentRegistration, RegisteredAgent};
pub use registry::{AgentFactory, AgentRegistry};
pub use tools::{
    AgentExecutionRecord, DiscoverAgentsTool, ExecuteAgentTool, ExecuteAgentsParallelTool,
    ExecutionRequest,
};
