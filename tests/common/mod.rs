//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use monia_agent::{
    AgentContext, ChatGateway, ChatRequest, ChatResponse, Error, Result, ToolCall,
};
use serde_json::Value;

/// Gateway that answers each agent from its own queue, picked by a
/// fragment of the agent's goal. Safe to share between concurrent agents.
#[derive(Default)]
pub struct RoutingGateway {
    routes: Mutex<Vec<(String, VecDeque<ChatResponse>)>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl RoutingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, goal_fragment: &str, responses: Vec<ChatResponse>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((goal_fragment.to_string(), responses.into()));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, goal_fragment: &str) -> Vec<ChatRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.system.contains(goal_fragment))
            .collect()
    }
}

#[async_trait]
impl ChatGateway for RoutingGateway {
    fn model(&self) -> &str {
        "routing"
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let mut routes = self.routes.lock().unwrap();
        let next = routes
            .iter_mut()
            .find(|(fragment, _)| request.system.contains(fragment.as_str()))
            .and_then(|(_, queue)| queue.pop_front());
        next.ok_or_else(|| Error::Api {
            message: format!("no scripted response for goal: {}", request.system),
            status: None,
        })
    }
}

pub fn context(gateway: Arc<RoutingGateway>) -> AgentContext {
    AgentContext::new(gateway)
}

pub fn call(id: &str, name: &str, arguments: Value) -> ChatResponse {
    ChatResponse::tool_calls(vec![ToolCall::new(id, name, arguments)])
}

pub fn complete(id: &str, answer: &str) -> ChatResponse {
    call(
        id,
        monia_agent::COMPLETION_TOOL_NAME,
        serde_json::json!({ "final_answer": answer }),
    )
}

pub fn text(content: &str) -> ChatResponse {
    ChatResponse::text(content)
}

/// Routes library spans to the test writer; `RUST_LOG` picks the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
