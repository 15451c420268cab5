//! JSON file configuration.
//!
//! Keys address nested objects with dots, so `llm.model` reads
//! `{"llm": {"model": "..."}}`. Writes create intermediate objects and
//! persist the whole document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

pub struct FileConfigProvider {
    path: PathBuf,
    data: Arc<RwLock<Option<Value>>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Arc::new(RwLock::new(None)),
        }
    }

    /// `<config dir>/monia/config.json`, e.g. `~/.config/monia/config.json`
    /// on Linux. `None` when no home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.config_dir().join("monia").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn reload(&self) -> ConfigResult<()> {
        let loaded = self.load().await?;
        *self.data.write().await = Some(loaded);
        Ok(())
    }

    async fn load(&self) -> ConfigResult<Value> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Value::Object(Map::new()));
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(ConfigError::Provider {
                message: format!("{} must contain a JSON object", self.path.display()),
            });
        }
        Ok(value)
    }

    async fn ensure_loaded(&self) -> ConfigResult<()> {
        if self.data.read().await.is_some() {
            return Ok(());
        }
        let loaded = self.load().await?;
        let mut data = self.data.write().await;
        if data.is_none() {
            *data = Some(loaded);
        }
        Ok(())
    }

    async fn save(&self, root: &Value) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(root)?).await?;
        Ok(())
    }
}

fn lookup<'a>(root: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(root, |current, part| current.get(part))
}

fn insert(root: &mut Value, key: &str, value: Value) -> ConfigResult<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop() else {
        return Ok(());
    };

    let mut current = root;
    for part in parts {
        let Value::Object(map) = current else {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{}' is not an object", part),
            });
        };
        current = map
            .entry(part)
            .or_insert_with(|| Value::Object(Map::new()));
    }

    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "parent is not an object".into(),
        }),
    }
}

fn remove(root: &mut Value, key: &str) -> bool {
    let (parent, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (parent, last),
        None => ("", key),
    };
    let target = if parent.is_empty() {
        Some(root)
    } else {
        parent
            .split('.')
            .try_fold(root, |current, part| current.get_mut(part))
    };
    match target {
        Some(Value::Object(map)) => map.remove(last).is_some(),
        _ => false,
    }
}

fn collect_leaf_keys(value: &Value, path: &str, keys: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, child) in map {
                let child_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{}.{}", path, name)
                };
                collect_leaf_keys(child, &child_path, keys);
            }
        }
        _ if !path.is_empty() => keys.push(path.to_string()),
        _ => {}
    }
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        self.ensure_loaded().await?;
        let data = self.data.read().await;
        Ok(data
            .as_ref()
            .and_then(|root| lookup(root, key))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
    }

    async fn set_raw(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.ensure_loaded().await?;
        let json: Value =
            serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

        let mut data = self.data.write().await;
        let root = data.get_or_insert_with(|| Value::Object(Map::new()));
        insert(root, key, json)?;
        self.save(root).await
    }

    async fn delete(&self, key: &str) -> ConfigResult<bool> {
        self.ensure_loaded().await?;
        let mut data = self.data.write().await;
        let Some(root) = data.as_mut() else {
            return Ok(false);
        };
        let existed = remove(root, key);
        if existed {
            self.save(root).await?;
        }
        Ok(existed)
    }

    async fn list_keys(&self, prefix: &str) -> ConfigResult<Vec<String>> {
        self.ensure_loaded().await?;
        let data = self.data.read().await;
        let mut keys = Vec::new();
        if let Some(root) = data.as_ref() {
            collect_leaf_keys(root, "", &mut keys);
        }
        keys.retain(|k| k.starts_with(prefix));
        keys.sort();
        Ok(keys)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_config(dir: &TempDir, value: Value) -> PathBuf {
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, value.to_string()).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_nested_reads() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            serde_json::json!({
                "llm": {"model": "gpt-4o-mini", "api_key": "sk-file"},
                "agent": {"max_turns": 6}
            }),
        )
        .await;

        let provider = FileConfigProvider::new(path);
        assert_eq!(
            provider.get_raw("llm.model").await.unwrap(),
            Some("gpt-4o-mini".to_string())
        );
        assert_eq!(
            provider.get_raw("agent.max_turns").await.unwrap(),
            Some("6".to_string())
        );
        assert_eq!(provider.get_raw("llm.missing").await.unwrap(), None);
        assert_eq!(provider.get_raw("llm.model.deeper").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("absent.json"));
        assert_eq!(provider.get_raw("llm.model").await.unwrap(), None);
        assert!(provider.list_keys("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, serde_json::json!([1, 2, 3])).await;
        let provider = FileConfigProvider::new(path);
        assert!(matches!(
            provider.get_raw("llm").await,
            Err(ConfigError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_nested_write_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let provider = FileConfigProvider::new(path.clone());
        provider.set_raw("llm.model", "gpt-4o").await.unwrap();
        provider.set_raw("agent.max_turns", "4").await.unwrap();

        let reopened = FileConfigProvider::new(path);
        assert_eq!(
            reopened.get_raw("llm.model").await.unwrap(),
            Some("gpt-4o".to_string())
        );
        assert_eq!(
            reopened.list_keys("").await.unwrap(),
            vec!["agent.max_turns".to_string(), "llm.model".to_string()]
        );
    }

    #[tokio::test]
    async fn test_delete_nested_key() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.json"));

        provider.set_raw("llm.base_url", "http://localhost/v1").await.unwrap();
        assert!(provider.delete("llm.base_url").await.unwrap());
        assert!(!provider.delete("llm.base_url").await.unwrap());
        assert_eq!(provider.get_raw("llm.base_url").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_through_scalar_fails() {
        let dir = TempDir::new().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.json"));

        provider.set_raw("llm", "\"flat\"").await.unwrap();
        assert!(matches!(
            provider.set_raw("llm.model", "x").await,
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
