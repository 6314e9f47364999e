//! Natural-language recipe assistant
//!
//! Loads a recipe dataset, exposes lookup tools over it to a hosted model and
//! serves questions over HTTP:
//!
//! - [`dataset`]: loading and querying the recipe collection
//! - [`tools`]: the tool set the model may call
//! - [`prompts`]: the system instruction
//! - [`server`]: the `POST /ask` surface

pub mod config;
pub mod dataset;
pub mod error;
pub mod prompts;
pub mod server;
pub mod tools;

pub use config::{RecipeConfig, RecipeConfigBuilder};
pub use dataset::{DatasetSource, Recipe, RecipeBook, RecipeFilter, RecipeQuery};
pub use error::{RecipeError, Result};

use pantry_llm::LLMProvider;
use pantry_runtime::{Orchestrator, OrchestratorConfig};
use std::sync::Arc;
use tracing::info;

/// Wire the recipe tools, system prompt and provider into an orchestrator
pub fn build_orchestrator(
    book: Arc<RecipeBook>,
    provider: Arc<dyn LLMProvider>,
    config: &RecipeConfig,
) -> Result<Orchestrator> {
    let registry = Arc::new(tools::recipe_tools(Arc::clone(&book), config.max_results)?);
    let definitions = pantry_runtime::tool_definitions(&registry);
    let system_prompt = prompts::system_prompt(&book, &definitions)?;

    let orchestrator_config = OrchestratorConfig::new(&config.model)
        .with_system_prompt(system_prompt)
        .with_max_tool_rounds(config.max_tool_rounds)
        .with_model_timeout(config.model_timeout)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature);

    info!(
        provider = provider.name(),
        model = %config.model,
        tools = registry.len(),
        recipes = book.len(),
        "Orchestrator ready"
    );

    Ok(Orchestrator::new(provider, registry, orchestrator_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_llm::ScriptedProvider;

    #[test]
    fn test_build_orchestrator() {
        let book = Arc::new(RecipeBook::default());
        let provider = Arc::new(ScriptedProvider::new());
        let config = RecipeConfig::builder().max_tool_rounds(2).build().unwrap();

        let orchestrator = build_orchestrator(book, provider, &config).unwrap();
        assert_eq!(orchestrator.config().max_tool_rounds, 2);
        assert_eq!(orchestrator.tool_definitions().len(), 5);
        assert!(orchestrator.config().system_prompt.contains("No recipes are loaded"));
        assert!(orchestrator.config().system_prompt.contains("search_recipes"));
    }
}
