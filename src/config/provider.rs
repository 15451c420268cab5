//! The configuration source abstraction.

use serde::{Serialize, de::DeserializeOwned};

use super::{ConfigError, ConfigResult};

/// A key/value configuration source. Keys are dotted paths such as
/// `llm.api_key`; values are raw strings, usually JSON.
#[async_trait::async_trait]
pub trait ConfigProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: &str) -> ConfigResult<()>;

    async fn delete(&self, key: &str) -> ConfigResult<bool>;

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>>;
}

/// Typed access on top of [`ConfigProvider`].
pub trait ConfigProviderExt: ConfigProvider {
    /// Reads `key` as `T`. Raw values that are not JSON are read as a JSON
    /// string, so `MONIA_LLM_MODEL=gpt-4o` works without quoting.
    fn get<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<Option<T>>> + Send
    where
        Self: Sync,
    {
        async move {
            match self.get_raw(key).await? {
                Some(raw) => parse_value(key, &raw).map(Some),
                None => Ok(None),
            }
        }
    }

    fn require<T: DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = ConfigResult<T>> + Send
    where
        Self: Sync,
    {
        async move {
            self.get(key).await?.ok_or_else(|| ConfigError::NotFound {
                key: key.to_string(),
            })
        }
    }

    fn set<T: Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> impl std::future::Future<Output = ConfigResult<()>> + Send
    where
        Self: Sync,
    {
        async move {
            let raw = serde_json::to_string(value)?;
            self.set_raw(key, &raw).await
        }
    }
}

impl<P: ConfigProvider + ?Sized> ConfigProviderExt for P {}

fn parse_value<T: DeserializeOwned>(key: &str, raw: &str) -> ConfigResult<T> {
    let invalid = |e: serde_json::Error| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    };
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_json::from_value(serde_json::Value::String(raw.to_string()))
            .map_err(|_| invalid(json_err)),
    }
}
