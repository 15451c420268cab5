//! Tool execution output types.

use serde::Serialize;

use super::error::ToolError;

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Success(String),
    /// A record the agent's output conversion can deserialize again.
    Structured(serde_json::Value),
    Error(ToolError),
    Empty,
}

impl ToolOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self::Success(content.into())
    }

    pub fn structured<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Structured(value),
            Err(e) => Self::error(format!("could not serialize tool output: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ToolError::execution_failed(message))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::Error(ToolError::invalid_input(message))
    }

    pub fn empty() -> Self {
        Self::Empty
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn as_error(&self) -> Option<&ToolError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn error_message(&self) -> String {
        match self {
            Self::Error(e) => e.to_string(),
            _ => String::new(),
        }
    }

    /// Text form fed back into the conversation.
    pub fn text(&self) -> String {
        match self {
            Self::Success(content) => content.clone(),
            Self::Structured(value) => value.to_string(),
            Self::Error(e) => e.to_string(),
            Self::Empty => String::new(),
        }
    }
}

impl From<ToolError> for ToolOutput {
    fn from(error: ToolError) -> Self {
        Self::Error(error)
    }
}

/// What a [`Tool`](crate::tools::Tool) hands back to the execution loop.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub output: ToolOutput,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        ToolOutput::success(content).into()
    }

    pub fn structured<T: Serialize>(value: &T) -> Self {
        ToolOutput::structured(value).into()
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolOutput::error(message).into()
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ToolOutput::invalid_input(message).into()
    }

    pub fn empty() -> Self {
        ToolOutput::Empty.into()
    }

    pub fn is_error(&self) -> bool {
        self.output.is_error()
    }

    pub fn text(&self) -> String {
        self.output.text()
    }

    pub fn error_message(&self) -> String {
        self.output.error_message()
    }

    pub fn as_error(&self) -> Option<&ToolError> {
        self.output.as_error()
    }
}

impl From<ToolOutput> for ToolResult {
    fn from(output: ToolOutput) -> Self {
        Self { output }
    }
}

impl From<ToolError> for ToolResult {
    fn from(error: ToolError) -> Self {
        ToolOutput::Error(error).into()
    }
}

impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        Self::success(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        Self::success(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_text_and_message() {
        let result = ToolResult::error("disk full");
        assert!(result.is_error());
        assert_eq!(result.text(), "execution failed: disk full");
        assert_eq!(result.error_message(), "execution failed: disk full");

        let provider: ToolResult = ToolError::provider("time", "server exited").into();
        assert_eq!(provider.text(), "provider 'time' failed: server exited");
        assert!(ToolResult::empty().text().is_empty());
        assert!(!ToolResult::success("ok").is_error());
    }

    #[test]
    fn test_structured_text_is_json() {
        #[derive(Serialize)]
        struct Reading {
            path: &'static str,
            size: u64,
        }

        let result = ToolResult::structured(&Reading {
            path: "a.txt",
            size: 3,
        });
        let parsed: serde_json::Value = serde_json::from_str(&result.text()).unwrap();
        assert_eq!(parsed["path"], "a.txt");
        assert_eq!(parsed["size"], 3);
    }
}
