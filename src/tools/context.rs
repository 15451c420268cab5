//! Execution context handed to every tool invocation.

use tokio_util::sync::CancellationToken;

#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    agent_name: Option<String>,
    cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn new(agent_name: impl Into<String>, cancellation: CancellationToken) -> Self {
        Self {
            agent_name: Some(agent_name.into()),
            cancellation,
        }
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.agent_name.as_deref()
    }

    /// Token of the run that invoked the tool. Tools that start nested work
    /// should hand out child tokens of it.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
