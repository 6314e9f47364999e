//! Shared utilities for pantry
//!
//! This crate provides common functionality used across the pantry workspace,
//! including logging setup, environment-driven configuration and small helpers.

pub mod config;
pub mod logging;
pub mod text;

pub use config::{Config, ConfigError, env_first, env_parse, env_var};
pub use logging::{LogFormat, init_tracing};
pub use text::truncate_chars;
