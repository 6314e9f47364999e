//! Error types for pantry-core
//!
//! Every way a single question can fail. None of these are fatal to the
//! process; the HTTP layer maps each one to an error response.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pantry-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for answering a question
#[derive(Error, Debug)]
pub enum Error {
    /// The question itself was unusable (blank, too long)
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    /// The model asked for a tool that is not registered
    #[error("Model requested unknown tool '{0}'")]
    UnknownTool(String),

    /// The model kept requesting tools past the configured cap
    #[error("No final answer after {max_rounds} tool-call rounds")]
    LoopBoundExceeded { max_rounds: usize },

    /// The hosted model did not reply in time
    #[error("Model call timed out after {0:?}")]
    UpstreamTimeout(Duration),

    /// The hosted model was unreachable or returned an error
    #[error("Model call failed: {0}")]
    Upstream(String),

    /// The model finished without producing any answer text
    #[error("Model returned an empty answer")]
    EmptyAnswer,

    /// Startup wiring failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Generic error message
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Stable machine-readable code for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuestion(_) => "invalid_question",
            Self::UnknownTool(_) => "unknown_tool",
            Self::LoopBoundExceeded { .. } => "loop_bound_exceeded",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::Upstream(_) => "upstream_failure",
            Self::EmptyAnswer => "empty_answer",
            Self::InitializationFailed(_) => "initialization_failed",
            Self::Generic(_) => "internal",
        }
    }

    /// Whether the caller caused this error (as opposed to the model or the server)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidQuestion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTool("drop_tables".to_string());
        assert_eq!(err.to_string(), "Model requested unknown tool 'drop_tables'");

        let err = Error::LoopBoundExceeded { max_rounds: 5 };
        assert_eq!(err.to_string(), "No final answer after 5 tool-call rounds");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            Error::InvalidQuestion(String::new()),
            Error::UnknownTool(String::new()),
            Error::LoopBoundExceeded { max_rounds: 1 },
            Error::UpstreamTimeout(Duration::from_secs(1)),
            Error::Upstream(String::new()),
            Error::EmptyAnswer,
            Error::InitializationFailed(String::new()),
            Error::Generic(String::new()),
        ];
        let mut kinds: Vec<_> = errors.iter().map(Error::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_only_invalid_question_is_client_error() {
        assert!(Error::InvalidQuestion("blank".to_string()).is_client_error());
        assert!(!Error::EmptyAnswer.is_client_error());
        assert!(!Error::UpstreamTimeout(Duration::from_secs(3)).is_client_error());
    }
}
