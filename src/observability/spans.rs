//! Structured span definitions for tracing.

use std::time::Instant;

use tracing::{Level, Span, field, span};
use uuid::Uuid;

/// Telemetry handle shared by every agent built from one context.
///
/// Spans created here carry the same `trace_id`, and nest under `parent`
/// when one is set.
#[derive(Debug, Clone)]
pub struct SpanContext {
    trace_id: Uuid,
    parent: Option<Span>,
}

impl Default for SpanContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SpanContext {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Span) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    fn parent_id(&self) -> Option<tracing::Id> {
        self.parent.as_ref().and_then(Span::id)
    }

    pub fn agent_execute_span(&self, agent: &str, model: &str) -> Span {
        span!(
            parent: self.parent_id(),
            Level::INFO,
            "agent.execute",
            trace_id = %self.trace_id,
            agent = agent,
            model = model,
            turns = field::Empty,
            termination = field::Empty,
        )
    }

    pub fn tool_execute_span(&self, tool_name: &str, call_id: &str) -> Span {
        span!(
            Level::INFO,
            "tool.execute",
            trace_id = %self.trace_id,
            tool_name = tool_name,
            call_id = call_id,
            is_error = field::Empty,
            duration_ms = field::Empty,
        )
    }

    pub fn workflow_span(&self, workflow: &str, workflow_id: &str) -> Span {
        span!(
            parent: self.parent_id(),
            Level::INFO,
            "workflow.execute",
            trace_id = %self.trace_id,
            workflow = workflow,
            workflow_id = workflow_id,
            success = field::Empty,
        )
    }

    pub fn workflow_step_span(&self, index: usize, agent: &str) -> Span {
        span!(
            Level::INFO,
            "workflow.step",
            trace_id = %self.trace_id,
            step = index,
            agent = agent,
            attempts = field::Empty,
            skipped = field::Empty,
        )
    }

    pub fn gateway_call_span(&self, model: &str, turn: u32) -> GatewayCallSpan {
        GatewayCallSpan::new(self.trace_id, model, turn)
    }
}

/// Span around one chat request, recording latency and requested tool calls.
pub struct GatewayCallSpan {
    span: Span,
    start: Instant,
}

impl GatewayCallSpan {
    fn new(trace_id: Uuid, model: &str, turn: u32) -> Self {
        let span = span!(
            Level::DEBUG,
            "gateway.call",
            trace_id = %trace_id,
            model = model,
            turn = turn,
            tool_calls = field::Empty,
            latency_ms = field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
        }
    }

    pub fn record_tool_calls(&self, count: usize) {
        self.span.record("tool_calls", count);
    }

    pub fn finish(self) {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.span.record("latency_ms", latency_ms);
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
