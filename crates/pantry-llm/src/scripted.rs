//! Deterministic provider that replays a script
//!
//! Useful for tests and offline demos: every call to [`LLMProvider::complete`]
//! pops the next [`ScriptStep`] and records the request it was given, so a
//! test can check exactly what the model would have seen.

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Result, ToolCall,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One scripted reaction to a completion request
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this response
    Respond(CompletionResponse),
    /// Fail with a request error carrying this message
    Fail(String),
    /// Sleep before answering with the inner step
    Delay(Duration, Box<ScriptStep>),
}

/// A provider that answers from a fixed script
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    repeat: Mutex<Option<ScriptStep>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedProvider {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw step
    pub fn then(self, step: ScriptStep) -> Self {
        lock(&self.steps).push_back(step);
        self
    }

    /// Append a final text answer
    pub fn then_answer(self, text: impl Into<String>) -> Self {
        self.then(ScriptStep::Respond(CompletionResponse::text(text)))
    }

    /// Append a single tool call
    pub fn then_tool_call(self, name: impl Into<String>, arguments: Value) -> Self {
        let id = format!("call_{}", lock(&self.steps).len());
        self.then_tool_calls(vec![ToolCall {
            id,
            name: name.into(),
            arguments,
        }])
    }

    /// Append one reply carrying several tool calls
    pub fn then_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.then(ScriptStep::Respond(CompletionResponse::tool_calls(calls)))
    }

    /// Append a provider failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.then(ScriptStep::Fail(message.into()))
    }

    /// Append a step that only answers after `delay`
    pub fn then_delayed(self, delay: Duration, step: ScriptStep) -> Self {
        self.then(ScriptStep::Delay(delay, Box::new(step)))
    }

    /// Once the script runs out, keep answering with this step forever
    pub fn repeating(self, step: ScriptStep) -> Self {
        *lock(&self.repeat) = Some(step);
        self
    }

    /// Every request received so far, in order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    /// Number of completion calls received
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_step(&self) -> Option<ScriptStep> {
        lock(&self.steps)
            .pop_front()
            .or_else(|| lock(&self.repeat).clone())
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        lock(&self.requests).push(request);

        let mut step = self
            .next_step()
            .ok_or_else(|| LLMError::UnexpectedResponse("script exhausted".to_string()))?;

        loop {
            match step {
                ScriptStep::Respond(response) => return Ok(response),
                ScriptStep::Fail(message) => return Err(LLMError::RequestFailed(message)),
                ScriptStep::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    step = *inner;
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, ModelReply};
    use serde_json::json;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest::builder("scripted-model")
            .add_message(Message::user(text))
            .build()
    }

    #[tokio::test]
    async fn test_replays_in_order_and_records_requests() {
        let provider = ScriptedProvider::new()
            .then_tool_call("find_recipes_by_name", json!({"name": "stew"}))
            .then_answer("Beef stew it is.");

        let first = provider.complete(request("one")).await.unwrap();
        assert!(matches!(first.reply(), ModelReply::ToolCalls(_)));

        let second = provider.complete(request("two")).await.unwrap();
        assert_eq!(
            second.reply(),
            ModelReply::FinalAnswer("Beef stew it is.".to_string())
        );

        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            provider.requests()[1].messages[0].text().as_deref(),
            Some("two")
        );
    }

    #[tokio::test]
    async fn test_exhausted_script_errors() {
        let provider = ScriptedProvider::new();
        assert!(provider.complete(request("anything")).await.is_err());
    }

    #[tokio::test]
    async fn test_failure_step() {
        let provider = ScriptedProvider::new().then_fail("HTTP 503");
        let err = provider.complete(request("q")).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn test_repeating_step_never_runs_out() {
        let provider = ScriptedProvider::new().repeating(ScriptStep::Respond(
            CompletionResponse::text("again"),
        ));
        for _ in 0..5 {
            assert!(provider.complete(request("q")).await.is_ok());
        }
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn test_delayed_step() {
        let provider = ScriptedProvider::new().then_delayed(
            Duration::from_millis(5),
            ScriptStep::Respond(CompletionResponse::text("late")),
        );
        let response = provider.complete(request("q")).await.unwrap();
        assert_eq!(response.reply(), ModelReply::FinalAnswer("late".to_string()));
    }
}
