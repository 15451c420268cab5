//! Layered configuration providers and [`Settings`] loading.
//!
//! ```rust,no_run
//! use monia_agent::config::{ConfigBuilder, SettingsLoader};
//!
//! # async fn example() -> Result<(), monia_agent::Error> {
//! let stack = ConfigBuilder::new()
//!     .env()
//!     .file("monia.json")
//!     .build()
//!     .await?;
//! let settings = SettingsLoader::new(stack).load().await?;
//! # Ok(())
//! # }
//! ```

pub mod composite;
pub mod env;
pub mod file;
pub mod memory;
pub mod provider;
pub mod settings;

pub use composite::CompositeConfigProvider;
pub use env::{DEFAULT_ENV_PREFIX, EnvConfigProvider};
pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
pub use provider::{ConfigProvider, ConfigProviderExt};
pub use settings::{AgentDefaults, DEFAULT_BASE_URL, DEFAULT_MODEL, Settings, SettingsLoader};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Key not found: {key}")]
    NotFound { key: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Provider error: {message}")]
    Provider { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Builds a [`CompositeConfigProvider`]; providers added first take priority.
#[derive(Default)]
pub struct ConfigBuilder {
    providers: Vec<Box<dyn ConfigProvider>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `MONIA_*` environment variables.
    pub fn env(self) -> Self {
        self.provider(Box::new(EnvConfigProvider::new()))
    }

    pub fn env_with_prefix(self, prefix: &str) -> Self {
        self.provider(Box::new(EnvConfigProvider::with_prefix(prefix)))
    }

    pub fn file(self, path: impl AsRef<std::path::Path>) -> Self {
        self.provider(Box::new(FileConfigProvider::new(path.as_ref())))
    }

    pub fn memory(self, provider: MemoryConfigProvider) -> Self {
        self.provider(Box::new(provider))
    }

    pub fn provider(mut self, provider: Box<dyn ConfigProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub async fn build(self) -> ConfigResult<CompositeConfigProvider> {
        Ok(self
            .providers
            .into_iter()
            .fold(CompositeConfigProvider::new(), |composite, provider| {
                composite.provider(provider)
            }))
    }
}
