//! The multi-turn tool-calling loop.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, debug, info, warn};

use super::{AgentRuntime, ConversationStep, ExecutionMetadata, TerminationReason};
use crate::client::ChatRequest;
use crate::tools::{COMPLETION_TOOL_NAME, ExecutionContext, TaskCompleteInput};
use crate::types::{ChatMessage, ToolCall, ToolError, ToolResult};
use crate::{Error, Result};

/// Consecutive turns without tool calls after which the model is considered done.
pub const QUIET_TURN_LIMIT: u32 = 2;

/// Final text and history of one successful run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub final_text: String,
    pub metadata: ExecutionMetadata,
}

impl AgentRuntime {
    /// Drives one conversation until the completion tool is called, the model
    /// stays quiet for two turns, or the turn budget runs out.
    ///
    /// Only gateway failures and cancellation end the run with an error; tool
    /// failures are fed back to the model as text.
    pub async fn run(&self, prompt: &str, cancel: &CancellationToken) -> Result<RunOutcome> {
        let span = self
            .telemetry
            .agent_execute_span(&self.name, self.gateway.model());
        self.run_inner(prompt, cancel, &span)
            .instrument(span.clone())
            .await
    }

    async fn run_inner(
        &self,
        prompt: &str,
        cancel: &CancellationToken,
        span: &Span,
    ) -> Result<RunOutcome> {
        let mut metadata = ExecutionMetadata::started(&self.name);
        let mut messages = vec![ChatMessage::user(prompt)];
        let mut quiet_turns = 0;
        let mut last_text = String::new();
        let mut termination = TerminationReason::TurnBudget;
        let context = ExecutionContext::new(&self.name, cancel.clone());

        info!(prompt_len = prompt.len(), max_turns = self.max_turns, "Starting agent execution");

        for turn in 1..=self.max_turns {
            if cancel.is_cancelled() {
                info!(turn, "Agent execution cancelled");
                return Err(Error::Cancelled);
            }
            metadata.turns = turn;
            debug!(turn, "Starting turn");

            let request = ChatRequest {
                system: self.goal.clone(),
                messages: messages.clone(),
                tools: self.offered.clone(),
            };
            let call_span = self.telemetry.gateway_call_span(self.gateway.model(), turn);
            let response = self
                .gateway
                .send(&request)
                .instrument(call_span.span().clone())
                .await
                .map_err(|e| {
                    warn!(turn, error = %e, "Chat gateway failed");
                    Error::Gateway {
                        agent: self.name.clone(),
                        source: Box::new(e),
                    }
                })?;
            call_span.record_tool_calls(response.tool_calls.len());
            call_span.finish();

            if !response.wants_tool_use() {
                if let Some(message) = response.messages.last() {
                    messages.push(message.clone());
                }
                last_text = response.last_text().to_string();
                metadata.record(ConversationStep::llm_response(&last_text));
                quiet_turns += 1;
                if quiet_turns >= QUIET_TURN_LIMIT {
                    termination = TerminationReason::QuietTurns;
                    break;
                }
                continue;
            }

            let accompanying = response.last_text();
            if !accompanying.is_empty() {
                debug!(text = %accompanying, "Model text alongside tool calls");
            }
            messages.extend(response.messages.iter().cloned());

            for call in &response.tool_calls {
                metadata.record(ConversationStep::tool_call(&call.name, call.arguments.clone()));

                if call.name == COMPLETION_TOOL_NAME {
                    let answer = TaskCompleteInput::from_arguments(&call.arguments).final_answer;
                    metadata.record(ConversationStep::tool_result(&call.name, answer.clone()));
                    return Ok(self.finish(metadata, answer, TerminationReason::CompletionTool, span));
                }

                let (text, failed) = self.dispatch(call, &context).await;
                metadata.record(if failed {
                    ConversationStep::tool_failure(&call.name, text.clone())
                } else {
                    ConversationStep::tool_result(&call.name, text.clone())
                });
                messages.push(ChatMessage::tool(&call.id, text));
            }
            quiet_turns = 0;
        }

        if termination == TerminationReason::TurnBudget {
            warn!(max_turns = self.max_turns, "Turn budget exhausted");
        }
        Ok(self.finish(metadata, last_text, termination, span))
    }

    fn finish(
        &self,
        mut metadata: ExecutionMetadata,
        final_text: String,
        termination: TerminationReason,
        span: &Span,
    ) -> RunOutcome {
        metadata.termination = Some(termination);
        metadata.finish();
        span.record("turns", metadata.turns);
        span.record("termination", tracing::field::debug(termination));
        info!(
            turns = metadata.turns,
            tool_calls = metadata.tool_call_count(),
            termination = ?termination,
            "Agent execution completed"
        );
        RunOutcome {
            final_text,
            metadata,
        }
    }

    /// Runs one tool call and returns the text fed back to the model, flagged
    /// when the call failed.
    async fn dispatch(&self, call: &ToolCall, context: &ExecutionContext) -> (String, bool) {
        let tool = match self
            .provider_tools
            .get(&call.name)
            .or_else(|| self.tools.get(&call.name))
        {
            Some(tool) => Arc::clone(tool),
            None => {
                warn!(tool = %call.name, "Model requested an unknown tool");
                return (format!("Error: Tool '{}' not found", call.name), true);
            }
        };

        let span = self.telemetry.tool_execute_span(&call.name, &call.id);
        let start = Instant::now();
        let outcome = AssertUnwindSafe(tool.execute(call.arguments.clone(), context))
            .catch_unwind()
            .instrument(span.clone())
            .await;
        span.record("duration_ms", start.elapsed().as_millis() as u64);

        match outcome {
            Ok(result) if result.is_error() => {
                span.record("is_error", true);
                let message = failure_message(&result);
                debug!(tool = %call.name, error = %message, "Tool returned an error");
                (format!("Error executing tool: {}", message), true)
            }
            Ok(result) => {
                span.record("is_error", false);
                (result.text(), false)
            }
            Err(panic) => {
                span.record("is_error", true);
                let message = panic_message(panic.as_ref());
                warn!(tool = %call.name, error = %message, "Tool panicked");
                (format!("Error executing tool: {}", message), true)
            }
        }
    }
}

fn failure_message(result: &ToolResult) -> String {
    match result.as_error() {
        Some(ToolError::ExecutionFailed { message }) => message.clone(),
        Some(error) => error.to_string(),
        None => result.error_message(),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}
