//! Why a tool call did not produce a result.

use thiserror::Error;

/// Failure reported by a tool. The execution loop turns it into text for
/// the model; it never aborts a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's input schema.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("execution failed: {message}")]
    ExecutionFailed { message: String },

    /// The external provider serving the tool failed or reported an error.
    #[error("provider '{provider}' failed: {message}")]
    Provider { provider: String, message: String },

    #[error("cancelled")]
    Cancelled,
}

impl ToolError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
