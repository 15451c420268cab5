//! Test helper types for agent tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::{Agent, AgentContext, AgentRuntime, TextCodec};
use crate::client::{ChatGateway, ChatRequest, ChatResponse};
use crate::mcp::{McpResult, McpToolDefinition, McpToolResult, ToolProvider};
use crate::tools::{ExecutionContext, Tool, ToolOutput, ToolResult};
use crate::types::ToolCall;
use crate::{Error, Result};

/// Gateway that replays canned responses and records every request.
///
/// Once the script runs out it keeps answering with `fallback`, or with an
/// API error when none is set.
#[derive(Default)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<Result<ChatResponse>>>,
    fallback: Option<ChatResponse>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedGateway {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            ..Default::default()
        }
    }

    pub fn repeating(response: ChatResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Default::default()
        }
    }

    /// Answers with `response` after the script runs out.
    pub fn with_fallback(mut self, response: ChatResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    pub fn failing(status: u16) -> Self {
        let gateway = Self::default();
        gateway.push_error(Error::Api {
            message: "upstream unavailable".into(),
            status: Some(status),
        });
        gateway
    }

    pub fn push_error(&self, error: Error) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match (next, &self.fallback) {
            (Some(response), _) => response,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(Error::Api {
                message: "script exhausted".into(),
                status: None,
            }),
        }
    }
}

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

pub fn complete(id: &str, answer: &str) -> ChatResponse {
    ChatResponse::tool_calls(vec![call(
        id,
        crate::COMPLETION_TOOL_NAME,
        serde_json::json!({ "final_answer": answer }),
    )])
}

pub fn context(gateway: Arc<ScriptedGateway>) -> AgentContext {
    AgentContext::new(gateway)
}

/// Plain text agent answering from `gateway`.
pub async fn text_agent(name: &str, gateway: Arc<ScriptedGateway>) -> Agent<TextCodec> {
    let runtime = AgentRuntime::builder(name)
        .specialty(format!("{} for tests", name))
        .goal("Answer the request.")
        .build(&context(gateway))
        .await
        .unwrap();
    Agent::new(runtime, TextCodec)
}

pub struct DummyTool {
    pub name: String,
    pub output: ToolOutput,
    pub calls: Arc<AtomicUsize>,
}

impl DummyTool {
    pub fn new(name: &str, output: ToolOutput) -> Self {
        Self {
            name: name.to_string(),
            output,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Tool for DummyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Dummy tool for testing"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _input: Value, _context: &ExecutionContext) -> ToolResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ToolResult::from(self.output.clone())
    }
}

/// Tool whose body panics.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "explode"
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: Value, _context: &ExecutionContext) -> ToolResult {
        panic!("kaboom")
    }
}

/// Provider serving a fixed catalog, optionally after a delay.
pub struct StaticProvider {
    pub name: String,
    pub tools: Vec<McpToolDefinition>,
    pub delay: Duration,
    pub reply: String,
}

impl StaticProvider {
    pub fn new(name: &str, tool_names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tools: tool_names
                .iter()
                .map(|t| McpToolDefinition {
                    name: t.to_string(),
                    description: format!("{} from {}", t, name),
                    input_schema: serde_json::json!({"type": "object", "properties": {}}),
                })
                .collect(),
            delay: Duration::ZERO,
            reply: format!("reply from {}", name),
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ToolProvider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> McpResult<Vec<McpToolDefinition>> {
        tokio::time::sleep(self.delay).await;
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, _name: &str, _arguments: Value) -> McpResult<McpToolResult> {
        Ok(McpToolResult::text(self.reply.clone()))
    }
}
