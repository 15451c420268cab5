//! The untyped agent: identity, offered tools and the collaborators the
//! execution loop talks to.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::AgentContext;
use crate::client::ChatGateway;
use crate::mcp::{McpServerConfig, ToolProvider, connect_server, load_catalog};
use crate::observability::SpanContext;
use crate::tools::{ProviderTool, TaskCompleteTool, Tool, ToolRegistry};
use crate::types::ToolDefinition;
use crate::{Error, Result};

/// A tool provider that could not be attached while building an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderWarning {
    pub provider: String,
    pub message: String,
}

/// Name, goal and tool set of an agent plus the handles needed to run it.
///
/// Built once through [`AgentRuntime::builder`] and never mutated afterwards,
/// so one runtime can serve concurrent executions.
pub struct AgentRuntime {
    pub(super) name: String,
    pub(super) specialty: String,
    pub(super) goal: String,
    pub(super) keywords: Vec<String>,
    pub(super) tools: ToolRegistry,
    pub(super) provider_tools: ToolRegistry,
    pub(super) offered: Vec<ToolDefinition>,
    pub(super) gateway: Arc<dyn ChatGateway>,
    pub(super) telemetry: SpanContext,
    pub(super) max_turns: u32,
    warnings: Vec<ProviderWarning>,
}

impl AgentRuntime {
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    /// Tool definitions sent with every request: provider tools first, then
    /// local tools they do not shadow.
    pub fn offered_tools(&self) -> &[ToolDefinition] {
        &self.offered
    }

    /// Local tool names in registration order, the completion tool first.
    pub fn local_tool_names(&self) -> Vec<&str> {
        self.tools.names()
    }

    pub fn provider_warnings(&self) -> &[ProviderWarning] {
        &self.warnings
    }

    pub fn can_handle(&self, task: &str) -> bool {
        matches_keywords(&self.keywords, task)
    }
}

/// Case-insensitive substring match of any keyword against `task`. An empty
/// keyword list accepts every task.
pub fn matches_keywords<K: AsRef<str>>(keywords: &[K], task: &str) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let task = task.to_lowercase();
    keywords
        .iter()
        .any(|k| task.contains(&k.as_ref().to_lowercase()))
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("name", &self.name)
            .field("specialty", &self.specialty)
            .field("tools", &self.tools)
            .field("provider_tools", &self.provider_tools)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

/// Builder for [`AgentRuntime`].
pub struct AgentBuilder {
    name: String,
    specialty: String,
    goal: String,
    keywords: Vec<String>,
    tools: Vec<Arc<dyn Tool>>,
    providers: Vec<Arc<dyn ToolProvider>>,
    mcp_servers: Vec<(String, Option<McpServerConfig>)>,
    max_turns: Option<u32>,
    provider_timeout: Option<Duration>,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: String::new(),
            goal: String::new(),
            keywords: Vec::new(),
            tools: Vec::new(),
            providers: Vec::new(),
            mcp_servers: Vec::new(),
            max_turns: None,
            provider_timeout: None,
        }
    }

    pub fn specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = specialty.into();
        self
    }

    /// System message for every request.
    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn tool_provider(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Starts an MCP server at build time and attaches its tools.
    pub fn mcp_server(mut self, name: impl Into<String>, config: McpServerConfig) -> Self {
        self.mcp_servers.push((name.into(), Some(config)));
        self
    }

    /// Like [`mcp_server`](Self::mcp_server), resolving the configuration
    /// from the [`AgentContext`] at build time.
    pub fn configured_mcp_server(mut self, name: impl Into<String>) -> Self {
        self.mcp_servers.push((name.into(), None));
        self
    }

    pub fn max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Validates the definition and loads every provider catalog.
    ///
    /// Providers that fail or exceed the registration timeout are skipped
    /// and reported through [`AgentRuntime::provider_warnings`].
    pub async fn build(self, context: &AgentContext) -> Result<AgentRuntime> {
        if self.name.trim().is_empty() {
            return Err(Error::config("Agent name is required"));
        }
        if self.goal.trim().is_empty() {
            return Err(Error::config(format!(
                "Agent '{}' requires a goal",
                self.name
            )));
        }
        let max_turns = self.max_turns.unwrap_or(context.max_turns());
        if max_turns == 0 {
            return Err(Error::config("max_turns must be at least 1"));
        }

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(TaskCompleteTool))?;
        for tool in self.tools {
            tools.register(tool)?;
        }

        let timeout = self.provider_timeout.unwrap_or(context.provider_timeout());
        let mut warnings = Vec::new();
        let mut providers = self.providers;

        for (server, config) in self.mcp_servers {
            let config = match config.or_else(|| context.mcp_server(&server).cloned()) {
                Some(config) => config,
                None => {
                    return Err(Error::config(format!(
                        "MCP server '{}' is not configured",
                        server
                    )));
                }
            };
            config.validate(&server)?;
            match connect_server(&server, config, timeout).await {
                Ok(client) => providers.push(client),
                Err(e) => {
                    warn!(agent = %self.name, server = %server, error = %e, "MCP server unavailable");
                    warnings.push(ProviderWarning {
                        provider: server,
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut provider_tools = ToolRegistry::new();
        for provider in providers {
            let catalog = match load_catalog(provider.as_ref(), timeout).await {
                Ok(catalog) => catalog,
                Err(e) => {
                    warn!(
                        agent = %self.name,
                        provider = %provider.name(),
                        error = %e,
                        "Tool provider skipped"
                    );
                    warnings.push(ProviderWarning {
                        provider: provider.name().to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            debug!(provider = %provider.name(), tools = catalog.len(), "Tool provider registered");
            for definition in catalog {
                let tool = ProviderTool::new(Arc::clone(&provider), definition);
                if let Err(e) = provider_tools.register(Arc::new(tool)) {
                    warn!(agent = %self.name, provider = %provider.name(), error = %e, "Provider tool skipped");
                    warnings.push(ProviderWarning {
                        provider: provider.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let mut offered = provider_tools.definitions();
        for tool in tools.iter() {
            if provider_tools.contains(tool.name()) {
                warn!(agent = %self.name, tool = %tool.name(), "Provider tool shadows local tool");
                continue;
            }
            offered.push(tool.definition());
        }

        Ok(AgentRuntime {
            name: self.name,
            specialty: self.specialty,
            goal: self.goal,
            keywords: self.keywords,
            tools,
            provider_tools,
            offered,
            gateway: Arc::clone(context.gateway()),
            telemetry: context.telemetry().clone(),
            max_turns,
            warnings,
        })
    }
}
