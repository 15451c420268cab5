//! Static workflows: a fixed sequence of agent steps with retries, input
//! transforms, conditional execution and continue-on-error.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use monia_agent::{AgentOutput, DynAgent, TextInput, WorkflowBuilder};
//!
//! # async fn example(reader: Arc<dyn DynAgent>, checker: Arc<dyn DynAgent>) -> monia_agent::Result<()> {
//! let workflow = WorkflowBuilder::new()
//!     .with_name("review")
//!     .register_agent(reader)
//!     .register_agent(checker)
//!     .add_step("FileReaderAgent", |step| step.max_retries(3))
//!     .add_conditional_step(
//!         "GuardRailAgent",
//!         |previous: &dyn AgentOutput| previous.success(),
//!         |step| step.continue_on_error(true),
//!     )
//!     .build()?;
//!
//! let result = workflow.execute(&TextInput::new("notes.txt"), Default::default()).await;
//! println!("{:?}", result.context.execution_path);
//! # Ok(())
//! # }
//! ```

mod builder;
mod context;
mod executor;
mod result;
mod step;

pub use builder::WorkflowBuilder;
pub use context::WorkflowContext;
pub use executor::Workflow;
pub use result::{StepExecutionResult, WorkflowExecutionResult};
pub use step::{DEFAULT_RETRY_DELAY, InputTransform, StepCondition, StepConfig, WorkflowStep};
