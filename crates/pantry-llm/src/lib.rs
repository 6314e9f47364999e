//! Hosted-model abstraction layer for pantry
//!
//! This crate provides provider-agnostic abstractions for talking to a hosted
//! large language model. It includes:
//!
//! - Message types for the conversation replayed to the model
//! - Completion request/response types and the two-variant [`ModelReply`]
//! - Tool definitions for function calling
//! - The [`LLMProvider`] trait
//! - An OpenAI-compatible provider and a scripted provider for tests

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod scripted;
pub mod tools;

// Re-export main types
pub use completion::{
    CompletionRequest, CompletionResponse, ModelReply, StopReason, TokenUsage, ToolCall,
};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use scripted::{ScriptStep, ScriptedProvider};
pub use tools::ToolDefinition;
