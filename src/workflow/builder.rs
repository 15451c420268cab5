//! Fluent construction of [`Workflow`]s.

use std::collections::HashMap;
use std::sync::Arc;

use super::{StepConfig, Workflow, WorkflowStep};
use crate::agent::{AgentOutput, DynAgent};
use crate::observability::SpanContext;
use crate::{Error, Result};

#[derive(Default)]
pub struct WorkflowBuilder {
    name: String,
    agents: HashMap<String, Arc<dyn DynAgent>>,
    steps: Vec<WorkflowStep>,
    telemetry: Option<SpanContext>,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_telemetry(mut self, telemetry: SpanContext) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Makes `agent` available to steps under its own name.
    pub fn register_agent(mut self, agent: Arc<dyn DynAgent>) -> Self {
        self.agents.insert(agent.name().to_string(), agent);
        self
    }

    /// Appends a step. The agent is looked up by name when the step runs.
    pub fn add_step<F>(mut self, agent_name: impl Into<String>, configure: F) -> Self
    where
        F: FnOnce(StepConfig) -> StepConfig,
    {
        self.steps.push(WorkflowStep {
            agent_name: agent_name.into(),
            config: configure(StepConfig::default()),
            condition: None,
        });
        self
    }

    /// Appends a step that runs only when `predicate` accepts the previous
    /// output.
    pub fn add_conditional_step<P, F>(
        mut self,
        agent_name: impl Into<String>,
        predicate: P,
        configure: F,
    ) -> Self
    where
        P: Fn(&dyn AgentOutput) -> bool + Send + Sync + 'static,
        F: FnOnce(StepConfig) -> StepConfig,
    {
        self.steps.push(WorkflowStep {
            agent_name: agent_name.into(),
            config: configure(StepConfig::default()),
            condition: Some(Arc::new(predicate)),
        });
        self
    }

    pub fn build(self) -> Result<Workflow> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Workflow name is required"));
        }
        Ok(Workflow {
            name: self.name,
            steps: self.steps,
            agents: self.agents,
            telemetry: self.telemetry.unwrap_or_default(),
        })
    }
}
