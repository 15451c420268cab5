//! OpenAI-compatible `chat/completions` gateway.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use super::{ChatGateway, ChatRequest, ChatResponse, DEFAULT_TIMEOUT, FinishReason, ModelConfig};
use crate::types::{ChatMessage, Role, ToolCall, ToolDefinition};
use crate::{Error, Result};

/// Gateway for any endpoint that speaks the OpenAI chat completions dialect.
///
/// The HTTP client is created on the first request and reused afterwards.
pub struct OpenAiGateway {
    config: ModelConfig,
    timeout: Duration,
    http: OnceCell<reqwest::Client>,
}

impl OpenAiGateway {
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            timeout: DEFAULT_TIMEOUT,
            http: OnceCell::new(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.http.initialized()
    }

    async fn http(&self) -> Result<&reqwest::Client> {
        self.http
            .get_or_try_init(|| async {
                debug!(base_url = %self.config.base_url, "Creating chat client");
                reqwest::Client::builder()
                    .timeout(self.timeout)
                    .build()
                    .map_err(Error::Network)
            })
            .await
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> WireRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system.is_empty() {
            messages.push(WireMessage::from(&ChatMessage::system(&request.system)));
        }
        messages.extend(request.messages.iter().map(WireMessage::from));

        WireRequest {
            model: &self.config.model,
            messages,
            tools: request.tools.iter().map(WireTool::from).collect(),
        }
    }
}

#[async_trait]
impl ChatGateway for OpenAiGateway {
    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model, messages = request.messages.len()))]
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let http = self.http().await?;
        let body = self.build_body(request);

        let response = http
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                message: extract_error_message(&text),
                status: Some(status.as_u16()),
            });
        }

        let completion: WireCompletion = response.json().await?;
        completion.into_response()
    }
}

fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let tool_calls = message.has_tool_calls().then(|| {
            message
                .tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    kind: "function".into(),
                    function: WireFunction {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect()
        });
        let content = if message.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(message.content.clone())
        };
        Self {
            role: message.role,
            content,
            tool_calls,
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".into()
}

#[derive(Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Serialize)]
struct WireTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireToolFunction<'a>,
}

#[derive(Serialize)]
struct WireToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

impl<'a> From<&'a ToolDefinition> for WireTool<'a> {
    fn from(tool: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireToolFunction {
                name: &tool.name,
                description: &tool.description,
                parameters: &tool.input_schema,
            },
        }
    }
}

#[derive(Deserialize)]
struct WireCompletion {
    #[serde(default)]
    choices: Vec<WireChoice>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl WireCompletion {
    fn into_response(self) -> Result<ChatResponse> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Parse("completion contained no choices".into()))?;

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let arguments = parse_arguments(&call.function.arguments);
                ToolCall::new(call.id, call.function.name, arguments)
            })
            .collect();

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("tool_calls") => FinishReason::ToolCalls,
            _ if !tool_calls.is_empty() => FinishReason::ToolCalls,
            _ => FinishReason::Text,
        };

        let content = choice.message.content.unwrap_or_default();
        let message = if tool_calls.is_empty() {
            ChatMessage::assistant(content)
        } else {
            ChatMessage::assistant_tool_calls(content, tool_calls.clone())
        };

        Ok(ChatResponse {
            finish_reason,
            messages: vec![message],
            tool_calls,
        })
    }
}

/// Arguments arrive as a JSON-encoded string; keep the raw text when it does
/// not parse so the tool can report the problem to the model.
fn parse_arguments(raw: &str) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
