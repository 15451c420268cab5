//! The orchestrator's three tools.

use async_trait::async_trait;
use futures::future::join_all;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::{AbortHandle, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, warn};

use super::AgentRegistry;
use crate::agent::{AgentContext, TextInput};
use crate::tools::{ExecutionContext, SchemaTool};
use crate::types::ToolResult;

/// One sub-agent invocation as reported back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecutionRecord {
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    pub success: bool,
    pub content: String,
    pub error_message: Option<String>,
}

impl AgentExecutionRecord {
    fn failed(agent_name: &str, message: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            task: None,
            success: false,
            content: String::new(),
            error_message: Some(message.into()),
        }
    }

    fn with_task(mut self, task: String) -> Self {
        self.task = Some(task);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequest {
    /// The name of the agent to execute
    pub agent_name: String,
    /// The task or prompt for the agent
    pub task: String,
}

/// Builds and runs registered agents on behalf of the tools.
#[derive(Clone)]
struct SubAgentRunner {
    registry: AgentRegistry,
    context: AgentContext,
}

impl SubAgentRunner {
    async fn run(
        &self,
        agent_name: &str,
        task: &str,
        cancel: CancellationToken,
    ) -> AgentExecutionRecord {
        let telemetry = self
            .context
            .telemetry()
            .clone()
            .with_parent(tracing::Span::current());
        let context = self.context.clone().with_telemetry(telemetry);

        let agent = match self.registry.create(agent_name, &context).await {
            Ok(agent) => agent,
            Err(e) => {
                warn!(agent = %agent_name, error = %e, "Sub-agent unavailable");
                return AgentExecutionRecord::failed(
                    agent_name,
                    format!("Failed to execute agent: {}", e),
                );
            }
        };

        info!(agent = %agent_name, "Executing sub-agent");
        let output = agent.execute_dyn(&TextInput::new(task), cancel).await;
        AgentExecutionRecord {
            agent_name: agent_name.to_string(),
            task: None,
            success: output.success(),
            content: output.content().to_string(),
            error_message: output.error_message().map(String::from),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct DiscoverAgentsInput {
    /// Optional task; when given, only agents whose keywords match it are listed
    #[serde(default)]
    pub task: Option<String>,
}

pub struct DiscoverAgentsTool {
    registry: AgentRegistry,
}

impl DiscoverAgentsTool {
    pub fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SchemaTool for DiscoverAgentsTool {
    type Input = DiscoverAgentsInput;
    const NAME: &'static str = "discover_agents";
    const DESCRIPTION: &'static str = "Discover all available agents and their capabilities";

    async fn handle(&self, input: DiscoverAgentsInput, _context: &ExecutionContext) -> ToolResult {
        match input.task.as_deref().map(str::trim) {
            Some(task) if !task.is_empty() => {
                ToolResult::structured(&self.registry.candidates(task))
            }
            _ => ToolResult::structured(&self.registry.catalog()),
        }
    }
}

pub struct ExecuteAgentTool {
    runner: SubAgentRunner,
}

impl ExecuteAgentTool {
    pub fn new(registry: AgentRegistry, context: AgentContext) -> Self {
        Self {
            runner: SubAgentRunner { registry, context },
        }
    }
}

#[async_trait]
impl SchemaTool for ExecuteAgentTool {
    type Input = ExecutionRequest;
    const NAME: &'static str = "execute_agent";
    const DESCRIPTION: &'static str = "Execute a specific agent with a given task";

    async fn handle(&self, input: ExecutionRequest, context: &ExecutionContext) -> ToolResult {
        let record = self
            .runner
            .run(
                &input.agent_name,
                &input.task,
                context.cancellation().child_token(),
            )
            .await;
        ToolResult::structured(&record)
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ParallelExecutionInput {
    /// Agent execution requests, run concurrently
    #[serde(default)]
    pub requests: Vec<ExecutionRequest>,
}

#[derive(Serialize)]
struct ParallelFailure<'a> {
    success: bool,
    #[serde(rename = "errorMessage")]
    error_message: &'a str,
}

#[derive(Serialize)]
struct ParallelResults {
    results: Vec<AgentExecutionRecord>,
}

/// Aborts the spawned sub-agents when the batch is dropped before it
/// finishes. Aborting a finished task is a no-op.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

pub struct ExecuteAgentsParallelTool {
    runner: SubAgentRunner,
}

impl ExecuteAgentsParallelTool {
    pub fn new(registry: AgentRegistry, context: AgentContext) -> Self {
        Self {
            runner: SubAgentRunner { registry, context },
        }
    }
}

#[async_trait]
impl SchemaTool for ExecuteAgentsParallelTool {
    type Input = ParallelExecutionInput;
    const NAME: &'static str = "execute_agents_parallel";
    const DESCRIPTION: &'static str =
        "Execute multiple agents in parallel with their respective tasks";

    async fn handle(&self, input: ParallelExecutionInput, context: &ExecutionContext) -> ToolResult {
        if input.requests.is_empty() {
            return ToolResult::structured(&ParallelFailure {
                success: false,
                error_message: "No execution requests provided",
            });
        }

        info!(count = input.requests.len(), "Executing agents in parallel");
        let handles: Vec<_> = input
            .requests
            .iter()
            .cloned()
            .map(|request| {
                let runner = self.runner.clone();
                let cancel = context.cancellation().child_token();
                let unit = async move {
                    if cancel.is_cancelled() {
                        return AgentExecutionRecord::failed(&request.agent_name, "cancelled")
                            .with_task(request.task);
                    }
                    let record = runner.run(&request.agent_name, &request.task, cancel).await;
                    record.with_task(request.task)
                };
                tokio::spawn(unit.in_current_span())
            })
            .collect();
        let _abort = AbortOnDrop(handles.iter().map(JoinHandle::abort_handle).collect());

        let results = join_all(handles)
            .await
            .into_iter()
            .zip(input.requests)
            .map(|(joined, request)| match joined {
                Ok(record) => record,
                Err(e) => {
                    warn!(agent = %request.agent_name, error = %e, "Sub-agent task aborted");
                    AgentExecutionRecord::failed(
                        &request.agent_name,
                        format!("Failed to execute agent: {}", e),
                    )
                    .with_task(request.task)
                }
            })
            .collect();

        ToolResult::structured(&ParallelResults { results })
    }
}
