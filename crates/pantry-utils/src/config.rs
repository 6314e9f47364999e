//! Configuration management utilities
//!
//! Configuration is environment-first. These helpers read variables, treat
//! blank values as unset and report parse failures with the variable name.

use crate::LogFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was present but could not be parsed
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Process-level configuration shared by every binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, etc.)
    pub environment: String,
    /// Log line format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "pantry".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Read `PANTRY_ENV` and `PANTRY_LOG_FORMAT`, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            app_name: defaults.app_name,
            environment: env_var("PANTRY_ENV").unwrap_or(defaults.environment),
            log_format: env_parse("PANTRY_LOG_FORMAT")?.unwrap_or(defaults.log_format),
        })
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Read an environment variable, treating blank values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read the first of several environment variables that is set
pub fn env_first(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env_var(name))
}

/// Read and parse an environment variable
pub fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
                reason: e.to_string(),
            }),
    }
}
