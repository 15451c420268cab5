//! Model endpoint configuration.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Shared model configuration: credentials, endpoint and model id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(
        serialize_with = "serialize_redacted",
        deserialize_with = "deserialize_secret"
    )]
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

fn serialize_redacted<S: serde::Serializer>(
    _key: &SecretString,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str("[REDACTED]")
}

fn deserialize_secret<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl ModelConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(Error::config("API key cannot be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::config("Base URL cannot be empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Base URL must be a valid URI: {}", e)))?;
        if self.model.trim().is_empty() {
            return Err(Error::config("Model cannot be empty"));
        }
        Ok(())
    }

    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}
