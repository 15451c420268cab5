//! The [`ToolProvider`] seam and bounded catalog loading.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{McpClient, McpError, McpResult, McpServerConfig, McpToolDefinition, McpToolResult};

/// How long an agent waits for a provider to hand over its tool catalog.
pub const PROVIDER_REGISTRATION_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of externally hosted tools.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn list_tools(&self) -> McpResult<Vec<McpToolDefinition>>;

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<McpToolResult>;
}

/// Fetches a provider's catalog, giving up after `timeout`.
pub async fn load_catalog(
    provider: &dyn ToolProvider,
    timeout: Duration,
) -> McpResult<Vec<McpToolDefinition>> {
    match tokio::time::timeout(timeout, provider.list_tools()).await {
        Ok(result) => result,
        Err(_) => Err(McpError::RegistrationTimeout {
            name: provider.name().to_string(),
            timeout,
        }),
    }
}

/// Validates `config`, starts the server and waits for its catalog.
pub async fn connect_server(
    name: &str,
    config: McpServerConfig,
    timeout: Duration,
) -> McpResult<Arc<McpClient>> {
    config.validate(name)?;
    let mut client = McpClient::new(name, config);
    match tokio::time::timeout(timeout, client.connect()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(McpError::RegistrationTimeout {
                name: name.to_string(),
                timeout,
            });
        }
    }
    Ok(Arc::new(client))
}
