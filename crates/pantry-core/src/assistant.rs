//! Core Assistant trait definition

use crate::Result;
use async_trait::async_trait;

/// Anything that can turn a free-text question into a final answer
///
/// The HTTP endpoint only depends on this trait, so the orchestrator can be
/// swapped for a stub in tests or for a different backend entirely.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Answer a single question
    ///
    /// Every call is independent: implementations must not carry mutable
    /// state from one question to the next.
    async fn answer(&self, question: &str) -> Result<String>;

    /// Get the assistant's name (used in logs and health output)
    fn name(&self) -> &str;
}
