//! Error types for the recipe service

use pantry_tools::RegistryError;
use thiserror::Error;

/// Recipe service errors
///
/// These are startup-time failures: a bad configuration, an unreadable
/// dataset or a tool set that does not assemble. Per-question failures are
/// [`pantry_core::Error`].
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Configuration is missing or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dataset location could not be understood
    #[error("Invalid dataset source '{0}'")]
    InvalidSource(String),

    /// The dataset file type is not CSV, JSON or JSON Lines
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the dataset
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The dataset content is malformed
    #[error("Dataset parse error: {0}")]
    Parse(String),

    /// Reading the dataset from storage failed
    #[error("Failed to fetch dataset from {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The recipe tools could not be registered
    #[error("Tool registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The system prompt template failed to render
    #[error("Prompt template error: {0}")]
    Prompt(#[from] minijinja::Error),
}

/// Result type alias for recipe operations
pub type Result<T> = std::result::Result<T, RecipeError>;

impl From<pantry_utils::ConfigError> for RecipeError {
    fn from(err: pantry_utils::ConfigError) -> Self {
        RecipeError::Config(err.to_string())
    }
}

impl From<RecipeError> for pantry_core::Error {
    fn from(err: RecipeError) -> Self {
        pantry_core::Error::InitializationFailed(err.to_string())
    }
}
