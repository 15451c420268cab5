//! Shared construction context for agents.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use crate::client::{ChatGateway, OpenAiGateway};
use crate::config::Settings;
use crate::mcp::{McpServerConfig, PROVIDER_REGISTRATION_TIMEOUT};
use crate::observability::SpanContext;

pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Everything an agent needs from its surroundings: the chat gateway, the
/// telemetry handle, defaults and the named MCP servers it may attach.
///
/// Cloning is cheap; every agent built from one context shares the gateway.
#[derive(Clone)]
pub struct AgentContext {
    gateway: Arc<dyn ChatGateway>,
    telemetry: SpanContext,
    max_turns: u32,
    provider_timeout: Duration,
    mcp_servers: Arc<HashMap<String, McpServerConfig>>,
}

impl AgentContext {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            telemetry: SpanContext::new(),
            max_turns: DEFAULT_MAX_TURNS,
            provider_timeout: PROVIDER_REGISTRATION_TIMEOUT,
            mcp_servers: Arc::new(HashMap::new()),
        }
    }

    /// Builds an [`OpenAiGateway`] from `settings.llm` and applies the agent
    /// defaults.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let gateway = OpenAiGateway::new(settings.llm.clone())?;
        Ok(Self::new(Arc::new(gateway))
            .with_max_turns(settings.agent.max_turns)
            .with_provider_timeout(Duration::from_secs(settings.agent.provider_timeout_secs))
            .with_mcp_servers(settings.mcp_servers.clone()))
    }

    pub fn with_telemetry(mut self, telemetry: SpanContext) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_mcp_servers(mut self, servers: HashMap<String, McpServerConfig>) -> Self {
        self.mcp_servers = Arc::new(servers);
        self
    }

    pub fn gateway(&self) -> &Arc<dyn ChatGateway> {
        &self.gateway
    }

    pub fn telemetry(&self) -> &SpanContext {
        &self.telemetry
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn provider_timeout(&self) -> Duration {
        self.provider_timeout
    }

    pub fn mcp_server(&self, name: &str) -> Option<&McpServerConfig> {
        self.mcp_servers.get(name)
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("model", &self.gateway.model())
            .field("trace_id", &self.telemetry.trace_id())
            .field("max_turns", &self.max_turns)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}
