//! Multi-criteria recipe search

use super::format;
use crate::dataset::{RecipeBook, RecipeFilter};
use async_trait::async_trait;
use pantry_tools::{Parameter, ParameterSchema, Tool, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Searches recipes by any combination of criteria, all of which must hold
pub struct SearchRecipesTool {
    book: Arc<RecipeBook>,
    max_results: usize,
    schema: ParameterSchema,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    ingredients: Vec<String>,
    recipe_name: Option<String>,
    category: Option<String>,
    cuisine: Option<String>,
    max_calories: Option<f64>,
    max_sodium: Option<f64>,
    max_cook_time: Option<u32>,
}

impl From<SearchParams> for RecipeFilter {
    fn from(params: SearchParams) -> Self {
        RecipeFilter {
            ingredients: params.ingredients,
            name: params.recipe_name,
            category: params.category,
            cuisine: params.cuisine,
            max_calories: params.max_calories,
            max_sodium: params.max_sodium,
            max_minutes: params.max_cook_time,
        }
    }
}

impl SearchRecipesTool {
    /// Create a new search tool
    pub fn new(book: Arc<RecipeBook>, max_results: usize) -> Self {
        let schema = ParameterSchema::new()
            .param(
                Parameter::string_array(
                    "ingredients",
                    "Ingredients that must ALL appear in the recipe, e.g. [\"chicken\", \"rice\"]",
                )
                .minimum(1.0)
                .maximum(10.0),
            )
            .param(Parameter::string("recipe_name", "Word or phrase contained in the recipe name"))
            .param(Parameter::string("category", "Recipe category, e.g. \"Dessert\" or \"Breakfast\""))
            .param(Parameter::string("cuisine", "Cuisine or keyword, e.g. \"Italian\", \"Vegan\", \"< 30 Mins\""))
            .param(Parameter::number("max_calories", "Maximum calories per serving").minimum(0.0))
            .param(Parameter::number("max_sodium", "Maximum sodium per serving, in mg").minimum(0.0))
            .param(Parameter::integer("max_cook_time", "Maximum total time, in minutes").minimum(0.0));

        Self {
            book,
            max_results,
            schema,
        }
    }
}

#[async_trait]
impl Tool for SearchRecipesTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let criteria = params.clone();
        let params: SearchParams = serde_json::from_value(params).map_err(|e| ToolError::InvalidRequest {
            message: format!("Invalid parameters: {e}"),
        })?;

        let filter = RecipeFilter::from(params);
        if filter.is_empty() {
            return Err(ToolError::InvalidRequest {
                message: "provide at least one criterion: ingredients, recipe_name, category, \
                          cuisine, max_calories, max_sodium or max_cook_time"
                    .to_string(),
            });
        }

        if self.book.is_empty() {
            return Ok(format::no_dataset());
        }

        let found = self.book.search(&filter);
        debug!(matches = found.len(), "search_recipes");
        Ok(format::matches(criteria, &found, self.max_results))
    }

    fn name(&self) -> &'static str {
        "search_recipes"
    }

    fn description(&self) -> &'static str {
        "Search the recipe dataset by any combination of ingredients, name, category, \
         cuisine/keyword, maximum calories, maximum sodium and maximum cook time. \
         Every criterion given must match. Use this for questions with several \
         requirements, such as \"quick Italian dinners under 500 calories\"."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }
}
