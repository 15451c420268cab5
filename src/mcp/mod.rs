//! External tool providers over the Model Context Protocol.
//!
//! An agent may attach any number of [`ToolProvider`]s. Their catalogs are
//! loaded once, at construction, under a bounded timeout; a provider that
//! fails or times out is reported and skipped.

pub mod client;
pub mod provider;

pub use client::McpClient;
pub use provider::{PROVIDER_REGISTRATION_TIMEOUT, ToolProvider, connect_server, load_catalog};

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(feature = "mcp")]
pub(crate) const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];
#[cfg(feature = "mcp")]
pub(crate) const MCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
#[cfg(feature = "mcp")]
pub(crate) const MCP_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// How to reach an MCP server, as written under `mcp.servers.<name>` in
/// settings. The `type` field selects the transport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpServerConfig {
    /// Child process speaking JSON-RPC over stdin/stdout.
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: HashMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
    /// Remote server; accepted in settings but refused at connect time.
    Sse {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl McpServerConfig {
    pub fn stdio(command: impl Into<String>, args: Vec<String>) -> Self {
        Self::Stdio {
            command: command.into(),
            args,
            env: Default::default(),
            cwd: None,
        }
    }

    pub fn sse(url: impl Into<String>) -> Self {
        Self::Sse {
            url: url.into(),
            headers: Default::default(),
        }
    }

    pub fn validate(&self, name: &str) -> McpResult<()> {
        let invalid = |message: String| Err(McpError::InvalidConfig { message });
        if name.trim().is_empty() {
            return invalid("MCP server name cannot be empty".into());
        }
        match self {
            Self::Stdio { command, .. } if command.trim().is_empty() => {
                invalid(format!("MCP server '{}' requires a command", name))
            }
            Self::Stdio { .. } => Ok(()),
            Self::Sse { url, .. } => match url::Url::parse(url) {
                Ok(_) => Ok(()),
                Err(e) => invalid(format!("MCP server '{}' has an invalid url: {}", name, e)),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum McpConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

/// Identity the server announced during the handshake.
#[derive(Clone, Debug)]
pub struct McpServerInfo {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
}

/// One entry of a provider's tool catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct McpToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i32, message: String },

    #[error("Tool '{tool}' did not answer within {:.1}s", timeout.as_secs_f64())]
    CallTimeout { tool: String, timeout: Duration },

    #[error("Invalid MCP server configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Tool provider '{name}' did not register within {:.1}s", timeout.as_secs_f64())]
    RegistrationTimeout { name: String, timeout: Duration },
}

pub type McpResult<T> = std::result::Result<T, McpError>;

/// Reply to a `tools/call`.
#[derive(Clone, Debug)]
pub struct McpToolResult {
    pub content: Vec<McpContent>,
    pub is_error: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum McpContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        mime_type: String,
    },
    Resource {
        uri: String,
        text: Option<String>,
        mime_type: Option<String>,
    },
}

impl McpToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Text blocks joined with newlines; images and resources are skipped.
    pub fn joined_text(&self) -> String {
        let mut joined = String::new();
        for block in &self.content {
            if let McpContent::Text { text } = block {
                if !joined.is_empty() {
                    joined.push('\n');
                }
                joined.push_str(text);
            }
        }
        joined
    }
}
