//! Resolved runtime settings.
//!
//! Keys read by [`SettingsLoader`]:
//!
//! | key                           | default                      |
//! |-------------------------------|------------------------------|
//! | `llm.api_key`                 | required                     |
//! | `llm.base_url`                | `https://api.openai.com/v1`  |
//! | `llm.model`                   | `gpt-4o-mini`                |
//! | `agent.max_turns`             | `10`                         |
//! | `agent.provider_timeout_secs` | `10`                         |
//! | `mcp_servers`                 | none                         |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::file::FileConfigProvider;
use super::provider::{ConfigProvider, ConfigProviderExt};
use super::{ConfigBuilder, ConfigResult};
use crate::client::ModelConfig;
use crate::mcp::McpServerConfig;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

fn default_max_turns() -> u32 {
    crate::agent::DEFAULT_MAX_TURNS
}

fn default_provider_timeout_secs() -> u64 {
    crate::mcp::PROVIDER_REGISTRATION_TIMEOUT.as_secs()
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub llm: ModelConfig,
    #[serde(default)]
    pub mcp_servers: HashMap<String, McpServerConfig>,
    #[serde(default)]
    pub agent: AgentDefaults,
}

impl Settings {
    pub fn new(llm: ModelConfig) -> Self {
        Self {
            llm,
            mcp_servers: HashMap::new(),
            agent: AgentDefaults::default(),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.llm.validate()?;
        if self.agent.max_turns == 0 {
            return Err(crate::Error::config("agent.max_turns must be at least 1"));
        }
        for (name, server) in &self.mcp_servers {
            server.validate(name)?;
        }
        Ok(())
    }
}

/// Reads [`Settings`] from a configuration provider.
pub struct SettingsLoader {
    provider: Box<dyn ConfigProvider>,
}

impl SettingsLoader {
    pub fn new(provider: impl ConfigProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    /// `MONIA_*` environment variables layered over the default config file.
    pub async fn standard() -> ConfigResult<Self> {
        let mut builder = ConfigBuilder::new().env();
        if let Some(path) = FileConfigProvider::default_path() {
            debug!(path = %path.display(), "Using config file");
            builder = builder.file(path);
        }
        Ok(Self::new(builder.build().await?))
    }

    pub async fn load(&self) -> crate::Result<Settings> {
        let provider = self.provider.as_ref();

        let api_key: String = provider.require("llm.api_key").await?;
        let base_url: String = provider
            .get("llm.base_url")
            .await?
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model: String = provider
            .get("llm.model")
            .await?
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let defaults = AgentDefaults::default();
        let agent = AgentDefaults {
            max_turns: provider
                .get("agent.max_turns")
                .await?
                .unwrap_or(defaults.max_turns),
            provider_timeout_secs: provider
                .get("agent.provider_timeout_secs")
                .await?
                .unwrap_or(defaults.provider_timeout_secs),
        };

        let mcp_servers: HashMap<String, McpServerConfig> =
            provider.get("mcp_servers").await?.unwrap_or_default();

        let settings = Settings {
            llm: ModelConfig::new(api_key, base_url, model),
            mcp_servers,
            agent,
        };
        settings.validate()?;
        debug!(
            model = %settings.llm.model,
            mcp_servers = settings.mcp_servers.len(),
            "Settings loaded"
        );
        Ok(settings)
    }
}

impl std::fmt::Debug for SettingsLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsLoader")
            .field("provider", &self.provider.name())
            .finish()
    }
}
