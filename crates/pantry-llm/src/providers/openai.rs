//! OpenAI-compatible chat-completions provider
//!
//! Speaks the `/chat/completions` wire format, which is served by OpenAI
//! itself, by Gemini's OpenAI-compatible endpoint and by most local model
//! servers. See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Example
//!
//! ```no_run
//! use pantry_llm::{CompletionRequest, LLMProvider, Message};
//! use pantry_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # async fn example() -> pantry_llm::Result<()> {
//! let config = OpenAIConfig::new("my-key")
//!     .with_api_base("https://generativelanguage.googleapis.com/v1beta/openai")
//!     .with_timeout(60);
//! let provider = OpenAIProvider::with_config(config)?;
//!
//! let request = CompletionRequest::builder("gemini-2.0-flash")
//!     .add_message(Message::user("What can I cook with leeks?"))
//!     .build();
//! let response = provider.complete(request).await?;
//! println!("{:?}", response.reply());
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use pantry_utils::truncate_chars;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL of the API, without the trailing `/chat/completions`
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `OPENAI_API_KEY` (required) and `OPENAI_API_BASE` (optional).
    pub fn from_env() -> Result<Self> {
        let api_key = pantry_utils::env_var("OPENAI_API_KEY").ok_or_else(|| {
            LLMError::ConfigurationError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let mut config = Self::new(api_key);
        if let Some(api_base) = pantry_utils::env_var("OPENAI_API_BASE") {
            config = config.with_api_base(api_base);
        }
        Ok(config)
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new provider with custom configuration
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a new provider with API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(OpenAIConfig::new(api_key))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(OpenAIConfig::from_env()?)
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(messages = request.messages.len(), "Sending chat completion request");

        let openai_request = OpenAIRequest {
            messages: build_openai_messages(request.system, request.messages),
            tools: request.tools.as_deref().map(convert_tools),
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 | 403 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(request.model),
                408 | 504 => LLMError::Timeout,
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LLMError::HttpError(e)
            } else {
                LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
            }
        })?;

        // Only the first choice is used
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let finish_reason = choice.finish_reason.unwrap_or_default();
        debug!(
            finish_reason = %finish_reason,
            input_tokens = openai_response.usage.prompt_tokens,
            output_tokens = openai_response.usage.completion_tokens,
            "Received chat completion"
        );

        Ok(CompletionResponse {
            message: parse_openai_response(choice.message),
            stop_reason: map_stop_reason(&finish_reason),
            usage: TokenUsage {
                input_tokens: openai_response.usage.prompt_tokens,
                output_tokens: openai_response.usage.completion_tokens,
            },
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl OpenAIMessage {
    fn text(role: &'static str, text: String) -> Self {
        Self {
            role,
            content: Some(text),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct OpenAIToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize)]
struct OpenAIFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: OpenAIUsage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseToolCall {
    #[serde(default)]
    id: String,
    function: OpenAIResponseFunctionCall,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Build OpenAI messages from the generic conversation
///
/// The system prompt goes first in the messages array.
fn build_openai_messages(system: Option<String>, messages: Vec<Message>) -> Vec<OpenAIMessage> {
    let mut result = Vec::with_capacity(messages.len() + 1);

    if let Some(sys) = system {
        result.push(OpenAIMessage::text("system", sys));
    }

    for msg in messages {
        result.extend(convert_message(msg));
    }

    result
}

/// Convert a single message
///
/// May return several wire messages: each tool result becomes its own
/// `role = "tool"` message.
fn convert_message(msg: Message) -> Vec<OpenAIMessage> {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    };

    match msg.content {
        Some(MessageContent::Text(text)) => vec![OpenAIMessage::text(role, text)],
        Some(MessageContent::Blocks(blocks)) => convert_blocks(role, blocks),
        None => vec![OpenAIMessage::text(role, String::new())],
    }
}

fn convert_blocks(role: &'static str, blocks: Vec<ContentBlock>) -> Vec<OpenAIMessage> {
    let mut tool_messages = Vec::new();
    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                let arguments = match input {
                    serde_json::Value::String(raw) => raw,
                    other => other.to_string(),
                };
                tool_calls.push(OpenAIToolCall {
                    id,
                    tool_type: "function",
                    function: OpenAIFunctionCall { name, arguments },
                });
            }
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                ..
            } => tool_messages.push(OpenAIMessage {
                role: "tool",
                content: Some(content),
                tool_calls: None,
                tool_call_id: Some(tool_use_id),
            }),
        }
    }

    let mut messages = Vec::with_capacity(tool_messages.len() + 1);
    if !texts.is_empty() || !tool_calls.is_empty() {
        messages.push(OpenAIMessage {
            role,
            content: if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            },
            tool_calls: if tool_calls.is_empty() {
                None
            } else {
                Some(tool_calls)
            },
            tool_call_id: None,
        });
    }
    messages.extend(tool_messages);
    messages
}

fn convert_tools(tools: &[ToolDefinition]) -> Vec<OpenAITool> {
    tools
        .iter()
        .map(|tool| OpenAITool {
            tool_type: "function",
            function: OpenAIFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

/// Parse the response message into the generic format
///
/// Arguments that are not valid JSON are kept as a raw string so that tool
/// argument validation can report the problem back to the model.
fn parse_openai_response(msg: OpenAIResponseMessage) -> Message {
    let mut blocks = Vec::new();

    if let Some(content) = msg.content.filter(|c| !c.is_empty()) {
        blocks.push(ContentBlock::Text { text: content });
    }

    for (index, call) in msg.tool_calls.unwrap_or_default().into_iter().enumerate() {
        let input = if call.function.arguments.trim().is_empty() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                warn!(
                    tool_name = %call.function.name,
                    error = %e,
                    arguments = %truncate_chars(&call.function.arguments, 200),
                    "Tool arguments are not valid JSON"
                );
                serde_json::Value::String(call.function.arguments.clone())
            })
        };

        let id = if call.id.is_empty() {
            format!("call_{index}")
        } else {
            call.id
        };

        blocks.push(ContentBlock::ToolUse {
            id,
            name: call.function.name,
            input,
        });
    }

    if blocks.is_empty() {
        blocks.push(ContentBlock::Text {
            text: String::new(),
        });
    }

    Message::assistant_blocks(blocks)
}

fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "tool_calls" | "function_call" => StopReason::ToolUse,
        "stop" | "" => StopReason::EndTurn,
        "content_filter" => {
            debug!("Content filtered by provider safety systems");
            StopReason::EndTurn
        }
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}
