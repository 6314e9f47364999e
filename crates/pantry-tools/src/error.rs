//! Error types for tools and the registry

use serde_json::{Value, json};
use thiserror::Error;

/// Outcome of a tool execution
///
/// The error side is an ordinary value: it gets relayed to the model as a
/// tool result so the model can retry with corrected arguments.
pub type ToolResult = std::result::Result<Value, ToolError>;

/// A recoverable tool failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    /// A required argument was absent or null
    #[error("missing required argument '{argument}'")]
    MissingArgument { argument: String },

    /// An argument had the wrong type or violated a constraint
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The arguments were individually fine but the request makes no sense as a whole
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The tool ran but could not complete
    #[error("tool failed: {message}")]
    ExecutionFailed { message: String },
}

impl ToolError {
    /// Shorthand for [`ToolError::InvalidArgument`]
    pub fn invalid(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Stable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingArgument { .. } => "missing_argument",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::ExecutionFailed { .. } => "execution_failed",
        }
    }

    /// Whether the model can fix this by changing its arguments
    pub fn is_argument_error(&self) -> bool {
        !matches!(self, Self::ExecutionFailed { .. })
    }

    /// JSON payload relayed to the model as the tool result
    pub fn to_payload(&self, tool: &str) -> Value {
        let hint = if self.is_argument_error() {
            "Correct the arguments according to the tool's schema and call it again."
        } else {
            "The tool could not complete this request; try a different approach."
        };
        json!({
            "tool": tool,
            "error": self.code(),
            "message": self.to_string(),
            "hint": hint,
        })
    }
}

/// Errors raised by the registry itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No tool with this name is registered
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// Two tools were registered under the same name
    #[error("tool '{0}' registered twice")]
    DuplicateTool(String),

    /// The name is not acceptable to model providers
    #[error("invalid tool name '{0}' (use 1-64 of [A-Za-z0-9_-])")]
    InvalidName(String),
}
