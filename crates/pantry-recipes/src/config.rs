//! Configuration for the recipe service

use crate::error::{RecipeError, Result};
use pantry_utils::{env_first, env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Gemini's OpenAI-compatible endpoint
pub const GEMINI_OPENAI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Upper bound for `max_results`
pub const MAX_RESULTS_LIMIT: usize = 20;

/// Configuration for the recipe service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Address the HTTP server listens on
    pub bind: String,

    /// Dataset location: local path, http(s) URL or gs://bucket/object
    pub dataset: String,

    /// Model identifier
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// API key for the hosted model
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum rounds of tool execution per question
    pub max_tool_rounds: usize,

    /// Timeout for a single model call
    pub model_timeout: Duration,

    /// Recipes included in a single tool result
    pub max_results: usize,

    /// Directory holding the browser client
    pub static_dir: PathBuf,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            dataset: "data/recipes.csv".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_base: GEMINI_OPENAI_API_BASE.to_string(),
            api_key: None,
            max_tool_rounds: 5,
            model_timeout: Duration::from_secs(60),
            max_results: 3,
            static_dir: PathBuf::from("static"),
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

impl RecipeConfig {
    /// Create a new configuration builder
    pub fn builder() -> RecipeConfigBuilder {
        RecipeConfigBuilder::default()
    }

    /// Defaults overlaid with `PANTRY_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;

        if self.dataset.trim().is_empty() {
            return Err(RecipeError::Config("dataset location must not be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(RecipeError::Config("model must not be empty".to_string()));
        }
        if self.max_tool_rounds == 0 {
            return Err(RecipeError::Config(
                "max_tool_rounds must be greater than 0".to_string(),
            ));
        }
        if self.model_timeout.is_zero() {
            return Err(RecipeError::Config(
                "model_timeout must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(RecipeError::Config(format!(
                "max_results must be between 1 and {MAX_RESULTS_LIMIT}"
            )));
        }

        Ok(())
    }

    /// Parsed listen address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| RecipeError::Config(format!("invalid bind address '{}': {e}", self.bind)))
    }
}

/// Builder for RecipeConfig
#[derive(Debug, Default)]
pub struct RecipeConfigBuilder {
    bind: Option<String>,
    dataset: Option<String>,
    model: Option<String>,
    api_base: Option<String>,
    api_key: Option<String>,
    max_tool_rounds: Option<usize>,
    model_timeout: Option<Duration>,
    max_results: Option<usize>,
    static_dir: Option<PathBuf>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
}

impl RecipeConfigBuilder {
    /// Set the listen address
    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = Some(bind.into());
        self
    }

    /// Set the dataset location
    pub fn dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the tool round cap
    pub fn max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = Some(rounds);
        self
    }

    /// Set the per-call model timeout
    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = Some(timeout);
        self
    }

    /// Set how many recipes a tool result shows
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the static asset directory
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Fill every unset field from the environment
    ///
    /// Values already set on the builder win, so explicit overrides (CLI
    /// flags) can be applied before or after this call.
    pub fn with_env(mut self) -> Result<Self> {
        if self.bind.is_none() {
            self.bind = env_var("PANTRY_BIND").or_else(|| env_var("PORT").map(|port| format!("0.0.0.0:{port}")));
        }
        if self.dataset.is_none() {
            self.dataset = env_var("PANTRY_DATASET");
        }
        if self.model.is_none() {
            self.model = env_var("PANTRY_MODEL");
        }
        if self.api_base.is_none() {
            self.api_base = env_var("PANTRY_API_BASE");
        }
        if self.api_key.is_none() {
            self.api_key = env_first(&["PANTRY_API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY"]);
        }
        if self.max_tool_rounds.is_none() {
            self.max_tool_rounds = env_parse("PANTRY_MAX_TOOL_ROUNDS")?;
        }
        if self.model_timeout.is_none() {
            self.model_timeout = env_parse::<u64>("PANTRY_MODEL_TIMEOUT_SECS")?.map(Duration::from_secs);
        }
        if self.max_results.is_none() {
            self.max_results = env_parse("PANTRY_MAX_RESULTS")?;
        }
        if self.static_dir.is_none() {
            self.static_dir = env_var("PANTRY_STATIC_DIR").map(PathBuf::from);
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<RecipeConfig> {
        let defaults = RecipeConfig::default();

        let config = RecipeConfig {
            bind: self.bind.unwrap_or(defaults.bind),
            dataset: self.dataset.unwrap_or(defaults.dataset),
            model: self.model.unwrap_or(defaults.model),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            api_key: self.api_key,
            max_tool_rounds: self.max_tool_rounds.unwrap_or(defaults.max_tool_rounds),
            model_timeout: self.model_timeout.unwrap_or(defaults.model_timeout),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            static_dir: self.static_dir.unwrap_or(defaults.static_dir),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
        };

        config.validate()?;
        Ok(config)
    }
}
