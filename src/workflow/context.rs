//! State carried across the steps of one workflow execution.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::agent::AgentOutput;

#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub workflow_id: Uuid,
    /// `"<agent>:<success>"` for every step, in execution order.
    pub execution_path: Vec<String>,
    /// Last output produced by each agent.
    pub previous_results: HashMap<String, Arc<dyn AgentOutput>>,
    pub shared_data: Map<String, Value>,
}

impl Default for WorkflowContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self {
            workflow_id: Uuid::new_v4(),
            execution_path: Vec::new(),
            previous_results: HashMap::new(),
            shared_data: Map::new(),
        }
    }

    pub(crate) fn record_step(&mut self, agent_name: &str, success: bool) {
        self.execution_path.push(format!("{}:{}", agent_name, success));
    }

    pub(crate) fn record_output(&mut self, agent_name: &str, output: Arc<dyn AgentOutput>) {
        self.previous_results.insert(agent_name.to_string(), output);
    }

    pub fn previous_result(&self, agent_name: &str) -> Option<&Arc<dyn AgentOutput>> {
        self.previous_results.get(agent_name)
    }

    pub fn set_shared(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.shared_data.insert(key.into(), value.into());
    }

    pub fn shared(&self, key: &str) -> Option<&Value> {
        self.shared_data.get(key)
    }
}
