//! Step and workflow execution results.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use super::WorkflowContext;
use crate::agent::AgentOutput;

#[derive(Debug, Clone)]
pub struct StepExecutionResult {
    /// 1-based position in the workflow.
    pub step_index: usize,
    pub agent_name: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Attempt that produced the recorded outcome; 0 when the agent never ran.
    pub attempt: u32,
    pub output: Option<Arc<dyn AgentOutput>>,
    pub skipped: bool,
    pub metadata: HashMap<String, Value>,
}

impl StepExecutionResult {
    pub(crate) fn started(step_index: usize, agent_name: &str) -> Self {
        let now = Utc::now();
        Self {
            step_index,
            agent_name: agent_name.to_string(),
            success: false,
            error_message: None,
            start_time: now,
            end_time: now,
            attempt: 0,
            output: None,
            skipped: false,
            metadata: HashMap::new(),
        }
    }

    pub fn step_name(&self) -> String {
        format!("Step{}", self.step_index)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowExecutionResult {
    pub workflow_name: String,
    pub success: bool,
    pub error_message: Option<String>,
    pub step_results: Vec<StepExecutionResult>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub context: WorkflowContext,
}

impl WorkflowExecutionResult {
    pub fn total_duration(&self) -> TimeDelta {
        self.end_time - self.start_time
    }

    /// Output of the last step that ran and succeeded.
    pub fn final_result(&self) -> Option<&Arc<dyn AgentOutput>> {
        self.step_results
            .iter()
            .rev()
            .filter(|r| r.success && !r.skipped)
            .find_map(|r| r.output.as_ref())
    }

    pub fn final_result_as<T: AgentOutput>(&self) -> Option<&T> {
        self.final_result().and_then(|output| output.downcast_ref::<T>())
    }
}
