//! Tool registry for managing available tools
//!
//! The registry is assembled once through [`ToolRegistryBuilder`] and is
//! read-only afterwards, so it can be shared across requests behind an
//! `Arc` without locking.

use crate::{RegistryError, Tool, ToolResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_NAME_LEN: usize = 64;

/// Immutable set of named tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Start building a registry
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// All tools in registration order
    ///
    /// The order is stable, which keeps the tool list sent to the model
    /// identical from one request to the next.
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up, validate and run a tool
    ///
    /// The outer `Result` fails only when the tool does not exist. Argument
    /// problems and execution failures come back as the inner
    /// [`ToolResult`] so they can be shown to the model.
    pub async fn invoke(&self, name: &str, params: Value) -> Result<ToolResult, RegistryError> {
        let tool = self
            .get(name)
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;

        let params = match tool.parameters().validate(params) {
            Ok(params) => params,
            Err(e) => {
                warn!(tool = name, error = %e, "Rejected tool arguments");
                return Ok(Err(e));
            }
        };

        debug!(tool = name, params = %params, "Executing tool");
        Ok(tool.execute(params).await)
    }
}

/// Collects tools and checks them before producing a [`ToolRegistry`]
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    /// Add a tool
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Check names and freeze the registry
    pub fn build(self) -> Result<ToolRegistry, RegistryError> {
        let mut index = HashMap::with_capacity(self.tools.len());
        for (i, tool) in self.tools.iter().enumerate() {
            let name = tool.name();
            if !is_valid_name(name) {
                return Err(RegistryError::InvalidName(name.to_string()));
            }
            if index.insert(name.to_string(), i).is_some() {
                return Err(RegistryError::DuplicateTool(name.to_string()));
            }
        }

        Ok(ToolRegistry {
            tools: self.tools,
            index,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
