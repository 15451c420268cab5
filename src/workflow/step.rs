//! Step definitions and per-step configuration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::agent::{AgentInput, AgentOutput};

/// Builds a step's input from the previous step's output (`None` for the
/// first step).
pub type InputTransform =
    Arc<dyn Fn(Option<&dyn AgentOutput>) -> Box<dyn AgentInput> + Send + Sync>;

/// Decides from the previous output whether a conditional step runs.
pub type StepCondition = Arc<dyn Fn(&dyn AgentOutput) -> bool + Send + Sync>;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How one workflow step runs.
#[derive(Clone)]
pub struct StepConfig {
    transform: Option<InputTransform>,
    max_retries: u32,
    retry_delay: Duration,
    continue_on_error: bool,
    metadata: HashMap<String, Value>,
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            transform: None,
            max_retries: 1,
            retry_delay: DEFAULT_RETRY_DELAY,
            continue_on_error: false,
            metadata: HashMap::new(),
        }
    }
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform<F, I>(mut self, transform: F) -> Self
    where
        F: Fn(Option<&dyn AgentOutput>) -> I + Send + Sync + 'static,
        I: AgentInput,
    {
        self.transform = Some(Arc::new(move |previous| {
            Box::new(transform(previous)) as Box<dyn AgentInput>
        }));
        self
    }

    /// Total attempts, including the first. Values below 1 are raised to 1.
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.max_retries = attempts.max(1);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn input_transform(&self) -> Option<&InputTransform> {
        self.transform.as_ref()
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn continues_on_error(&self) -> bool {
        self.continue_on_error
    }

    pub fn metadata_map(&self) -> &HashMap<String, Value> {
        &self.metadata
    }
}

impl std::fmt::Debug for StepConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepConfig")
            .field("transform", &self.transform.is_some())
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .field("continue_on_error", &self.continue_on_error)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// One entry of a workflow: which agent runs and how.
#[derive(Clone)]
pub struct WorkflowStep {
    pub agent_name: String,
    pub config: StepConfig,
    pub condition: Option<StepCondition>,
}

impl WorkflowStep {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// A conditional step runs only when there is a previous output and the
    /// predicate accepts it.
    pub(crate) fn should_run(&self, previous: Option<&dyn AgentOutput>) -> bool {
        match (&self.condition, previous) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(condition), Some(previous)) => condition(previous),
        }
    }
}

impl std::fmt::Debug for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStep")
            .field("agent_name", &self.agent_name)
            .field("config", &self.config)
            .field("conditional", &self.is_conditional())
            .finish()
    }
}
