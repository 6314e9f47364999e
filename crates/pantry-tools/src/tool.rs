//! Tool trait definition

use crate::{ParameterSchema, ToolResult};
use async_trait::async_trait;
use serde_json::Value;

/// A function the hosted model can ask to run
///
/// Arguments reach [`Tool::execute`] already validated and normalised
/// against [`Tool::parameters`] when invoked through the registry, so
/// implementations can deserialise them straight into a typed struct.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with validated parameters
    async fn execute(&self, params: Value) -> ToolResult;

    /// Unique name, as the model will see it
    fn name(&self) -> &str;

    /// Tells the model when this tool is useful
    fn description(&self) -> &str;

    /// Declared parameters
    fn parameters(&self) -> &ParameterSchema;

    /// JSON Schema for the input, derived from [`Tool::parameters`]
    fn input_schema(&self) -> Value {
        self.parameters().to_json_schema()
    }
}
