use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::registration::RegisteredAgent;
use super::registry::AgentRegistry;
use super::tools::{DiscoverAgentsTool, ExecuteAgentTool, ExecuteAgentsParallelTool};
use crate::Result;
use crate::agent::{
    Agent, AgentContext, AgentInput, AgentOutput, AgentRuntime, DynAgent, TextCodec, TextInput,
    TextOutput,
};

pub const ORCHESTRATOR_NAME: &str = "OrchestratorAgent";

const SPECIALTY: &str = "Dynamic agent discovery and orchestration";
const KEYWORDS: &[&str] = &["orchestrate", "coordinate", "multi-agent", "discover", "execute"];

pub const ORCHESTRATOR_GOAL: &str = "You are an orchestrator that completes tasks by delegating \
to other agents.

Your workflow:
1. Analyze the task to understand what needs to be done.
2. Call discover_agents to see which agents are available.
3. Choose the agent or agents whose specialties fit the task.
4. Run them with execute_agent, or with execute_agents_parallel when the parts are independent.
5. Check every result for success or failure.
6. Combine the results into one answer and pass it to task_complete.";

/// An agent whose tools discover and run the agents in its registry.
pub struct OrchestratorAgent {
    agent: Agent<TextCodec>,
    registry: AgentRegistry,
}

impl OrchestratorAgent {
    pub async fn build(context: &AgentContext) -> Result<Self> {
        Self::with_registry(context, AgentRegistry::new()).await
    }

    /// Uses an existing registry; agents registered on it later are visible
    /// to the orchestrator too.
    pub async fn with_registry(context: &AgentContext, registry: AgentRegistry) -> Result<Self> {
        let runtime = AgentRuntime::builder(ORCHESTRATOR_NAME)
            .specialty(SPECIALTY)
            .goal(ORCHESTRATOR_GOAL)
            .keywords(KEYWORDS.iter().copied())
            .tool(DiscoverAgentsTool::new(registry.clone()))
            .tool(ExecuteAgentTool::new(registry.clone(), context.clone()))
            .tool(ExecuteAgentsParallelTool::new(registry.clone(), context.clone()))
            .build(context)
            .await?;
        Ok(Self {
            agent: Agent::new(runtime, TextCodec),
            registry,
        })
    }

    pub fn register_agent<T: RegisteredAgent>(&self) -> &Self {
        self.registry.register::<T>();
        info!(agent = T::NAME, "Registered agent type");
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> &AgentRuntime {
        self.agent.runtime()
    }

    pub async fn execute(&self, input: TextInput, cancel: CancellationToken) -> TextOutput {
        self.agent.execute(input, cancel).await
    }
}

impl std::fmt::Debug for OrchestratorAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrchestratorAgent")
            .field("registry", &self.registry)
            .finish()
    }
}

#[async_trait]
impl DynAgent for OrchestratorAgent {
    fn name(&self) -> &str {
        self.agent.name()
    }

    fn specialty(&self) -> &str {
        self.agent.runtime().specialty()
    }

    fn keywords(&self) -> &[String] {
        self.agent.runtime().keywords()
    }

    async fn execute_dyn(
        &self,
        input: &dyn AgentInput,
        cancel: CancellationToken,
    ) -> Arc<dyn AgentOutput> {
        self.agent.execute_dyn(input, cancel).await
    }
}
