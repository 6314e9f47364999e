//! The model/tool dispatch loop
//!
//! One call to [`Orchestrator::run`] handles one question:
//! 1. Send the conversation and tool schemas to the model
//! 2. On a final answer, return it
//! 3. On tool calls, check every requested name, run the tools in order,
//!    append their results and loop back
//!
//! Nothing here is shared between questions except the provider and the
//! read-only registry, so any number of questions can run concurrently.

use async_trait::async_trait;
use pantry_core::{Assistant, Error, Result};
use pantry_llm::{
    CompletionRequest, CompletionResponse, LLMProvider, Message, ModelReply, ToolCall,
    ToolDefinition,
};
use pantry_tools::{RegistryError, ToolRegistry};
use pantry_utils::truncate_chars;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Longest question accepted, in characters
pub const MAX_QUESTION_CHARS: usize = 4000;

/// Tool arguments logged per call, in characters
const MAX_INPUT_PREVIEW_CHARS: usize = 500;

/// Fallback system instruction when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Use the available tools to look things up before answering.";

/// Configuration for the dispatch loop
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model identifier passed to the provider
    pub model: String,

    /// System instruction seeded into every conversation
    pub system_prompt: String,

    /// Maximum rounds of tool execution per question
    pub max_tool_rounds: usize,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Upper bound on a single model call
    pub model_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tool_rounds: 5,
            max_tokens: 2048,
            temperature: Some(0.2),
            model_timeout: Duration::from_secs(60),
        }
    }
}

impl OrchestratorConfig {
    /// Defaults with the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the system instruction
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the tool round cap
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Set the per-call model timeout
    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = timeout;
        self
    }

    /// Set max tokens per completion
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One tool execution performed while answering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Value,
    /// The result relayed to the model was an error payload
    pub is_error: bool,
}

/// A completed answer plus what it took to get there
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    /// Rounds of tool execution used
    pub rounds: usize,
    /// Every tool run, in execution order
    pub invocations: Vec<ToolInvocation>,
}

/// Runs questions through the model and the tool registry
pub struct Orchestrator {
    provider: Arc<dyn LLMProvider>,
    registry: Arc<ToolRegistry>,
    tools: Vec<ToolDefinition>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator
    ///
    /// The tool schemas offered to the model are taken from `registry` here,
    /// once, so the names the model sees are exactly the names that can run.
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        let tools = tool_definitions(&registry);

        Self {
            provider,
            registry,
            tools,
            config,
        }
    }

    /// Tool schemas sent with every model call
    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Active configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer a single question
    #[instrument(skip(self, question), fields(model = %self.config.model))]
    pub async fn run(&self, question: &str) -> Result<Answer> {
        let question = validate_question(question)?;
        let max_rounds = self.config.max_tool_rounds;

        let mut conversation = vec![Message::user(question)];
        let mut invocations = Vec::new();
        let mut rounds = 0;

        loop {
            info!(
                iteration = rounds + 1,
                max_tool_rounds = max_rounds,
                "Calling model"
            );
            let response = self.call_model(&conversation).await?;

            let calls = match response.reply() {
                ModelReply::FinalAnswer(text) => {
                    if text.trim().is_empty() {
                        warn!(rounds, "Model finished without answer text");
                        return Err(Error::EmptyAnswer);
                    }
                    info!(
                        rounds,
                        tool_calls = invocations.len(),
                        answer_length = text.len(),
                        "Question answered"
                    );
                    return Ok(Answer {
                        text,
                        rounds,
                        invocations,
                    });
                }
                ModelReply::ToolCalls(calls) => calls,
            };

            // Reject the whole round before anything executes
            if let Some(unknown) = calls.iter().find(|call| !self.registry.contains(&call.name)) {
                error!(
                    tool_name = %unknown.name,
                    available = ?self.registry.names(),
                    "Model requested a tool that is not registered"
                );
                return Err(Error::UnknownTool(unknown.name.clone()));
            }

            if rounds >= max_rounds {
                warn!(max_rounds, "Model still requesting tools at the round cap");
                return Err(Error::LoopBoundExceeded { max_rounds });
            }

            rounds += 1;
            debug!(round = rounds, tool_count = calls.len(), "Executing tool round");
            conversation.push(response.message);

            for call in calls {
                let (message, invocation) = self.execute_tool(call).await?;
                conversation.push(message);
                invocations.push(invocation);
            }
        }
    }

    async fn call_model(&self, conversation: &[Message]) -> Result<CompletionResponse> {
        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .system(&self.config.system_prompt)
            .max_tokens(self.config.max_tokens)
            .tools(self.tools.clone());
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        let request = builder.build();

        let timeout = self.config.model_timeout;
        let started = Instant::now();
        match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Model call timed out");
                Err(Error::UpstreamTimeout(timeout))
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!(error = %e, "Model transport timed out");
                Err(Error::UpstreamTimeout(timeout))
            }
            Ok(Err(e)) => {
                error!(error = %e, "Model call failed");
                Err(Error::Upstream(e.to_string()))
            }
            Ok(Ok(response)) => {
                info!(
                    stop_reason = ?response.stop_reason,
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Model response received"
                );
                Ok(response)
            }
        }
    }

    async fn execute_tool(&self, call: ToolCall) -> Result<(Message, ToolInvocation)> {
        let ToolCall {
            id,
            name,
            arguments,
        } = call;

        let input_preview = truncate_chars(&arguments.to_string(), MAX_INPUT_PREVIEW_CHARS);
        info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");

        let started = Instant::now();
        let outcome = self
            .registry
            .invoke(&name, arguments.clone())
            .await
            .map_err(|e| match e {
                RegistryError::UnknownTool(name) => Error::UnknownTool(name),
                other => Error::Generic(other.to_string()),
            })?;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (message, is_error) = match outcome {
            Ok(result) => {
                let result = result.to_string();
                info!(
                    tool_name = %name,
                    duration_ms,
                    result_length = result.len(),
                    "Tool execution succeeded"
                );
                (Message::tool_result(id, result), false)
            }
            Err(e) => {
                warn!(tool_name = %name, duration_ms, error = %e, "Tool returned an error");
                (Message::tool_error(id, e.to_payload(&name).to_string()), true)
            }
        };

        Ok((
            message,
            ToolInvocation {
                name,
                arguments,
                is_error,
            },
        ))
    }
}

/// Tool schemas for every tool in `registry`, in registration order
pub fn tool_definitions(registry: &ToolRegistry) -> Vec<ToolDefinition> {
    registry
        .list_tools()
        .iter()
        .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
        .collect()
}

fn validate_question(question: &str) -> Result<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::InvalidQuestion("question must not be empty".to_string()));
    }
    let length = question.chars().count();
    if length > MAX_QUESTION_CHARS {
        return Err(Error::InvalidQuestion(format!(
            "question is {length} characters long; the limit is {MAX_QUESTION_CHARS}"
        )));
    }
    Ok(question)
}

#[async_trait]
impl Assistant for Orchestrator {
    async fn answer(&self, question: &str) -> Result<String> {
        self.run(question).await.map(|answer| answer.text)
    }

    fn name(&self) -> &str {
        "orchestrator"
    }
}
