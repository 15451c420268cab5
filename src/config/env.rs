//! Environment variable configuration.
//!
//! `llm.api_key` is read from `MONIA_LLM_API_KEY`. The environment is
//! read-only from the provider's point of view.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

pub const DEFAULT_ENV_PREFIX: &str = "MONIA_";

#[derive(Debug, Clone)]
pub struct EnvConfigProvider {
    prefix: String,
}

impl EnvConfigProvider {
    /// Provider reading `MONIA_*` variables.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn env_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase().replace('.', "_"))
    }

    /// Best-effort inverse of `env_key`; underscores inside a segment cannot
    /// be told apart from separators, so all of them become dots.
    fn key_from_env(&self, env_name: &str) -> Option<String> {
        env_name
            .strip_prefix(&self.prefix)
            .map(|rest| rest.to_lowercase().replace('_', "."))
    }

    fn read_only() -> ConfigError {
        ConfigError::Provider {
            message: "Environment variables are read-only at runtime".into(),
        }
    }
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.env_key(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }

    async fn set_raw(&self, _key: &str, _value: &str) -> ConfigResult<()> {
        Err(Self::read_only())
    }

    async fn delete(&self, _key: &str) -> ConfigResult<bool> {
        Err(Self::read_only())
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        let env_prefix = self.env_key(prefix);
        Ok(std::env::vars()
            .filter(|(name, _)| name.starts_with(&env_prefix))
            .filter_map(|(name, _)| self.key_from_env(&name))
            .collect())
    }
}
