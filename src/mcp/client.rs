//! MCP client over rmcp, usable as a [`ToolProvider`].
//!
//! Only the stdio transport is wired up. Without the `mcp` feature every
//! connection attempt fails, which agents report as a provider warning.

use async_trait::async_trait;
use serde_json::Value;

use super::provider::ToolProvider;
use super::{
    McpConnectionStatus, McpError, McpResult, McpServerConfig, McpServerInfo, McpToolDefinition,
    McpToolResult,
};

#[cfg(feature = "mcp")]
use std::collections::HashMap;
#[cfg(feature = "mcp")]
use std::sync::Arc;

#[cfg(feature = "mcp")]
use rmcp::{
    RoleClient,
    model::{CallToolRequestParam, RawContent, ResourceContents},
    service::{RunningService, ServiceError, ServiceExt},
    transport::{ConfigureCommandExt, TokioChildProcess},
};
#[cfg(feature = "mcp")]
use tokio::time::timeout;
#[cfg(feature = "mcp")]
use tracing::{info, warn};

#[cfg(feature = "mcp")]
use super::{MCP_CALL_TIMEOUT, MCP_CONNECT_TIMEOUT, McpContent, SUPPORTED_PROTOCOL_VERSIONS};

#[cfg(feature = "mcp")]
type Session = RunningService<RoleClient, ()>;

/// One connection to an MCP server. The tool catalog is fetched once, while
/// connecting, and served from memory afterwards.
pub struct McpClient {
    name: String,
    config: McpServerConfig,
    status: McpConnectionStatus,
    server_info: Option<McpServerInfo>,
    tools: Vec<McpToolDefinition>,
    #[cfg(feature = "mcp")]
    session: Option<Arc<Session>>,
}

impl McpClient {
    pub fn new(name: impl Into<String>, config: McpServerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            status: McpConnectionStatus::Connecting,
            server_info: None,
            tools: Vec::new(),
            #[cfg(feature = "mcp")]
            session: None,
        }
    }

    pub fn config(&self) -> &McpServerConfig {
        &self.config
    }

    pub fn server_info(&self) -> Option<&McpServerInfo> {
        self.server_info.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.status == McpConnectionStatus::Connected
    }

    pub fn tools(&self) -> &[McpToolDefinition] {
        &self.tools
    }

    /// Starts the server process and loads its catalog.
    pub async fn connect(&mut self) -> McpResult<()> {
        self.config.validate(&self.name)?;
        let result = self.open().await;
        if result.is_err() {
            self.status = McpConnectionStatus::Disconnected;
        }
        result
    }

    #[cfg(not(feature = "mcp"))]
    async fn open(&mut self) -> McpResult<()> {
        Err(McpError::ConnectionFailed {
            message: format!(
                "cannot start MCP server '{}': built without the `mcp` feature",
                self.name
            ),
        })
    }

    #[cfg(feature = "mcp")]
    async fn open(&mut self) -> McpResult<()> {
        match self.config.clone() {
            McpServerConfig::Stdio {
                command,
                args,
                env,
                cwd,
            } => self.open_stdio(&command, &args, &env, cwd.as_deref()).await,
            McpServerConfig::Sse { url, .. } => Err(McpError::Protocol {
                message: format!(
                    "MCP server '{}' uses SSE ({}), which is not supported; run it over stdio",
                    self.name, url
                ),
            }),
        }
    }

    #[cfg(feature = "mcp")]
    async fn open_stdio(
        &mut self,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
        cwd: Option<&str>,
    ) -> McpResult<()> {
        let process = tokio::process::Command::new(command).configure(|cmd| {
            cmd.args(args).envs(env);
            if let Some(dir) = cwd {
                cmd.current_dir(dir);
            }
        });
        let transport = TokioChildProcess::new(process).map_err(|e| McpError::ConnectionFailed {
            message: format!("could not spawn '{}': {}", command, e),
        })?;

        let session: Session = match timeout(MCP_CONNECT_TIMEOUT, ().serve(transport)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                return Err(McpError::ConnectionFailed {
                    message: format!("handshake with '{}' failed: {}", self.name, e),
                });
            }
            Err(_) => {
                return Err(McpError::ConnectionFailed {
                    message: format!(
                        "handshake with '{}' timed out after {:?}",
                        self.name, MCP_CONNECT_TIMEOUT
                    ),
                });
            }
        };

        if let Some(peer) = session.peer_info() {
            let protocol_version = peer.protocol_version.to_string();
            if !SUPPORTED_PROTOCOL_VERSIONS.contains(&protocol_version.as_str()) {
                warn!(server = %self.name, protocol = %protocol_version, "Unrecognised MCP protocol version");
            }
            self.server_info = Some(McpServerInfo {
                name: peer.server_info.name.to_string(),
                version: peer.server_info.version.to_string(),
                protocol_version,
            });
        }

        let listed = session
            .list_tools(Default::default())
            .await
            .map_err(|e| service_error(e, "tools/list"))?;
        self.tools = listed
            .tools
            .into_iter()
            .map(|tool| McpToolDefinition {
                name: tool.name.to_string(),
                description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
                input_schema: Value::Object((*tool.input_schema).clone()),
            })
            .collect();

        info!(server = %self.name, tools = self.tools.len(), "MCP server connected");
        self.status = McpConnectionStatus::Connected;
        self.session = Some(Arc::new(session));
        Ok(())
    }

    #[cfg(not(feature = "mcp"))]
    async fn call(&self, _name: &str, _arguments: Value) -> McpResult<McpToolResult> {
        Err(McpError::ConnectionFailed {
            message: format!("MCP server '{}' is not connected", self.name),
        })
    }

    #[cfg(feature = "mcp")]
    async fn call(&self, name: &str, arguments: Value) -> McpResult<McpToolResult> {
        let session = self.session.as_ref().ok_or_else(|| McpError::ConnectionFailed {
            message: format!("MCP server '{}' is not connected", self.name),
        })?;

        let request = CallToolRequestParam {
            name: name.to_string().into(),
            arguments: arguments.as_object().cloned(),
        };
        let result = timeout(MCP_CALL_TIMEOUT, session.call_tool(request))
            .await
            .map_err(|_| McpError::CallTimeout {
                tool: name.to_string(),
                timeout: MCP_CALL_TIMEOUT,
            })?
            .map_err(|e| service_error(e, "tools/call"))?;

        Ok(McpToolResult {
            content: result.content.iter().map(|c| content_block(&c.raw)).collect(),
            is_error: result.is_error.unwrap_or(false),
        })
    }
}

/// Keeps JSON-RPC error codes; everything else becomes a protocol error.
#[cfg(feature = "mcp")]
fn service_error(e: ServiceError, method: &str) -> McpError {
    match e {
        ServiceError::McpError(data) => McpError::JsonRpc {
            code: data.code.0,
            message: data.message.to_string(),
        },
        other => McpError::Protocol {
            message: format!("{} failed: {}", method, other),
        },
    }
}

#[cfg(feature = "mcp")]
fn content_block(raw: &RawContent) -> McpContent {
    match raw {
        RawContent::Text(text) => McpContent::Text {
            text: text.text.clone(),
        },
        RawContent::Image(image) => McpContent::Image {
            data: image.data.clone(),
            mime_type: image.mime_type.clone(),
        },
        RawContent::Resource(embedded) => match &embedded.resource {
            ResourceContents::TextResourceContents {
                uri,
                mime_type,
                text,
                ..
            } => McpContent::Resource {
                uri: uri.clone(),
                text: Some(text.clone()),
                mime_type: mime_type.clone(),
            },
            ResourceContents::BlobResourceContents { uri, mime_type, .. } => {
                McpContent::Resource {
                    uri: uri.clone(),
                    text: None,
                    mime_type: mime_type.clone(),
                }
            }
        },
        RawContent::ResourceLink(link) => McpContent::Resource {
            uri: link.uri.clone(),
            text: None,
            mime_type: link.mime_type.clone(),
        },
        RawContent::Audio(_) => McpContent::Text {
            text: "[audio]".to_string(),
        },
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> McpResult<Vec<McpToolDefinition>> {
        if !self.is_connected() {
            return Err(McpError::ConnectionFailed {
                message: format!("MCP server '{}' is not connected", self.name),
            });
        }
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<McpToolResult> {
        self.call(name, arguments).await
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("tools", &self.tools.len())
            .finish()
    }
}
