//! Conversation orchestration for pantry
//!
//! The [`Orchestrator`] runs one question through the hosted model, executing
//! whatever tools the model asks for until it produces an answer or hits the
//! configured round cap.

pub mod orchestrator;

pub use orchestrator::{
    Answer, DEFAULT_SYSTEM_PROMPT, MAX_QUESTION_CHARS, Orchestrator, OrchestratorConfig,
    ToolInvocation, tool_definitions,
};
