//! Core abstractions for pantry
//!
//! This crate defines the question-answering seam shared by the orchestrator
//! and the HTTP surface, plus the error taxonomy every request can end in.

pub mod assistant;
pub mod error;

pub use assistant::Assistant;
pub use error::{Error, Result};
