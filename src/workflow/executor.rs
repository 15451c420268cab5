//! Sequential step execution.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, warn};

use super::{StepExecutionResult, WorkflowContext, WorkflowExecutionResult, WorkflowStep};
use crate::agent::{AgentInput, AgentOutput, DynAgent, TextInput, TextOutput};
use crate::observability::SpanContext;

const CONTINUE_PROMPT: &str = "Continue with the workflow";

/// A named, immutable sequence of steps over a set of agents.
pub struct Workflow {
    pub(super) name: String,
    pub(super) steps: Vec<WorkflowStep>,
    pub(super) agents: HashMap<String, Arc<dyn DynAgent>>,
    pub(super) telemetry: SpanContext,
}

enum StepOutcome {
    Ran(StepExecutionResult),
    Skipped(StepExecutionResult),
    MissingAgent(StepExecutionResult),
}

impl Workflow {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn agent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub async fn execute_text(
        &self,
        prompt: &str,
        cancel: CancellationToken,
    ) -> WorkflowExecutionResult {
        self.execute(&TextInput::new(prompt), cancel).await
    }

    /// Runs every step in order. Failures are reported in the result, never
    /// returned as errors.
    pub async fn execute(
        &self,
        input: &dyn AgentInput,
        cancel: CancellationToken,
    ) -> WorkflowExecutionResult {
        let context = WorkflowContext::new();
        let span = self
            .telemetry
            .workflow_span(&self.name, &context.workflow_id.to_string());
        let result = self
            .execute_inner(input, cancel, context)
            .instrument(span.clone())
            .await;
        span.record("success", result.success);
        result
    }

    async fn execute_inner(
        &self,
        input: &dyn AgentInput,
        cancel: CancellationToken,
        mut context: WorkflowContext,
    ) -> WorkflowExecutionResult {
        let start_time = Utc::now();
        let mut step_results = Vec::with_capacity(self.steps.len());
        let mut previous: Option<Arc<dyn AgentOutput>> = None;
        let mut error_message = None;

        info!(workflow = %self.name, steps = self.steps.len(), "Starting workflow");

        for (index, step) in self.steps.iter().enumerate() {
            let number = index + 1;
            if cancel.is_cancelled() {
                info!(workflow = %self.name, step = number, "Workflow cancelled");
                error_message = Some("cancelled".to_string());
                break;
            }

            let span = self.telemetry.workflow_step_span(number, &step.agent_name);
            let outcome = self
                .run_step(number, step, input, previous.as_deref(), &cancel)
                .instrument(span.clone())
                .await;

            match outcome {
                StepOutcome::Skipped(result) => {
                    span.record("skipped", true);
                    context.record_step(&step.agent_name, true);
                    step_results.push(result);
                }
                StepOutcome::MissingAgent(result) => {
                    context.record_step(&step.agent_name, false);
                    error_message = Some(step_failure(number, &result));
                    step_results.push(result);
                    break;
                }
                StepOutcome::Ran(result) => {
                    span.record("attempts", result.attempt);
                    context.record_step(&step.agent_name, result.success);
                    let forward = result.success || step.config.continues_on_error();
                    if forward && let Some(output) = &result.output {
                        previous = Some(Arc::clone(output));
                        context.record_output(&step.agent_name, Arc::clone(output));
                    }
                    if !result.success && !step.config.continues_on_error() {
                        error_message = Some(step_failure(number, &result));
                        step_results.push(result);
                        break;
                    }
                    step_results.push(result);
                }
            }
        }

        let success = error_message.is_none();
        info!(workflow = %self.name, success, "Workflow completed");

        WorkflowExecutionResult {
            workflow_name: self.name.clone(),
            success,
            error_message,
            step_results,
            start_time,
            end_time: Utc::now(),
            context,
        }
    }

    async fn run_step(
        &self,
        number: usize,
        step: &WorkflowStep,
        initial: &dyn AgentInput,
        previous: Option<&dyn AgentOutput>,
        cancel: &CancellationToken,
    ) -> StepOutcome {
        let mut result = StepExecutionResult::started(number, &step.agent_name);
        result.metadata = step.config.metadata_map().clone();

        if !step.should_run(previous) {
            info!(step = number, agent = %step.agent_name, "Skipping conditional step");
            result.success = true;
            result.skipped = true;
            result.end_time = Utc::now();
            return StepOutcome::Skipped(result);
        }

        let Some(agent) = self.agents.get(&step.agent_name) else {
            warn!(step = number, agent = %step.agent_name, "Workflow step references an unknown agent");
            result.error_message = Some(format!("Agent '{}' not found", step.agent_name));
            result.end_time = Utc::now();
            return StepOutcome::MissingAgent(result);
        };

        let owned;
        let input: &dyn AgentInput = match (step.config.input_transform(), previous) {
            (Some(transform), previous) => {
                owned = transform(previous);
                owned.as_ref()
            }
            (None, _) if number == 1 => initial,
            (None, previous) => {
                owned = carry_forward(previous);
                owned.as_ref()
            }
        };

        let attempts = step.config.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(step = number, agent = %step.agent_name, attempt, "Executing workflow step");
            let output = agent.execute_dyn(input, cancel.clone()).await;
            result.attempt = attempt;
            result.success = output.success();
            result.error_message = output.error_message().map(String::from);
            result.output = Some(output);

            if result.success || attempt >= attempts {
                break;
            }

            warn!(
                step = number,
                attempt,
                error = result.error_message.as_deref().unwrap_or_default(),
                "Workflow step failed, retrying"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(step = number, "Retry delay interrupted by cancellation");
                    break;
                }
                _ = tokio::time::sleep(step.config.delay()) => {}
            }
        }

        result.end_time = Utc::now();
        StepOutcome::Ran(result)
    }
}

/// Default input for steps after the first: text outputs pass through,
/// anything else becomes a generic continuation prompt.
fn carry_forward(previous: Option<&dyn AgentOutput>) -> Box<dyn AgentInput> {
    match previous.and_then(|p| p.downcast_ref::<TextOutput>()) {
        Some(text) => Box::new(TextInput::new(text.content.clone())),
        None => Box::new(TextInput::new(CONTINUE_PROMPT)),
    }
}

fn step_failure(number: usize, result: &StepExecutionResult) -> String {
    format!(
        "Step {} failed: {}",
        number,
        result.error_message.as_deref().unwrap_or("unknown error")
    )
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("agents", &self.agent_names())
            .finish()
    }
}
