//! Single-criterion lookups: by ingredient, category or name

use super::format;
use crate::dataset::{RecipeBook, RecipeQuery};
use async_trait::async_trait;
use pantry_tools::{Parameter, ParameterSchema, Tool, ToolError, ToolResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupKind {
    Ingredient,
    Category,
    Name,
}

impl LookupKind {
    fn tool_name(self) -> &'static str {
        match self {
            Self::Ingredient => "find_recipes_by_ingredient",
            Self::Category => "find_recipes_by_category",
            Self::Name => "find_recipes_by_name",
        }
    }

    fn argument(self) -> &'static str {
        match self {
            Self::Ingredient => "ingredient",
            Self::Category => "category",
            Self::Name => "name",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Ingredient => {
                "Find recipes that use an ingredient. Matching is a case-insensitive \
                 substring over each ingredient, so \"rice\" also finds \"jasmine rice\"."
            }
            Self::Category => {
                "Find recipes in a category such as \"Dessert\", \"Breakfast\" or \"Soups\". \
                 The category must match exactly (case-insensitive); the system prompt \
                 lists the available categories."
            }
            Self::Name => {
                "Find recipes whose name contains a word or phrase, case-insensitive."
            }
        }
    }

    fn parameter_help(self) -> &'static str {
        match self {
            Self::Ingredient => "A single ingredient, e.g. \"chicken\"",
            Self::Category => "Category name, e.g. \"Dessert\"",
            Self::Name => "Word or phrase from the recipe name, e.g. \"risotto\"",
        }
    }

    fn query(self, value: String) -> RecipeQuery {
        match self {
            Self::Ingredient => RecipeQuery::Ingredient(value),
            Self::Category => RecipeQuery::Category(value),
            Self::Name => RecipeQuery::Name(value),
        }
    }
}

/// Runs one [`RecipeQuery`] kind against the dataset
pub struct LookupTool {
    book: Arc<RecipeBook>,
    kind: LookupKind,
    max_results: usize,
    schema: ParameterSchema,
}

impl LookupTool {
    fn new(book: Arc<RecipeBook>, kind: LookupKind, max_results: usize) -> Self {
        let schema = ParameterSchema::new()
            .param(Parameter::string(kind.argument(), kind.parameter_help()).required());
        Self {
            book,
            kind,
            max_results,
            schema,
        }
    }

    /// `find_recipes_by_ingredient`
    pub fn by_ingredient(book: Arc<RecipeBook>, max_results: usize) -> Self {
        Self::new(book, LookupKind::Ingredient, max_results)
    }

    /// `find_recipes_by_category`
    pub fn by_category(book: Arc<RecipeBook>, max_results: usize) -> Self {
        Self::new(book, LookupKind::Category, max_results)
    }

    /// `find_recipes_by_name`
    pub fn by_name(book: Arc<RecipeBook>, max_results: usize) -> Self {
        Self::new(book, LookupKind::Name, max_results)
    }
}

#[async_trait]
impl Tool for LookupTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let argument = self.kind.argument();
        let value = params
            .get(argument)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingArgument {
                argument: argument.to_string(),
            })?
            .to_string();

        if self.book.is_empty() {
            return Ok(format::no_dataset());
        }

        let found = self.book.query(&self.kind.query(value.clone()));
        debug!(tool = self.kind.tool_name(), matches = found.len(), "Lookup finished");
        Ok(format::matches(json!({ argument: value }), &found, self.max_results))
    }

    fn name(&self) -> &str {
        self.kind.tool_name()
    }

    fn description(&self) -> &str {
        self.kind.description()
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetFormat;

    const FIXTURE: &str = include_str!("../../fixtures/recipes.csv");

    fn book() -> Arc<RecipeBook> {
        Arc::new(RecipeBook::from_bytes(FIXTURE.as_bytes(), DatasetFormat::Csv).unwrap())
    }

    #[tokio::test]
    async fn test_by_ingredient() {
        let tool = LookupTool::by_ingredient(book(), 3);
        assert_eq!(tool.name(), "find_recipes_by_ingredient");

        let result = tool.execute(json!({"ingredient": "shrimp"})).await.unwrap();
        assert_eq!(result["total_matches"], 1);
        assert_eq!(result["recipes"][0]["name"], "Lemon Garlic Shrimp Pasta");
        assert_eq!(result["criteria"], json!({"ingredient": "shrimp"}));
    }

    #[tokio::test]
    async fn test_by_category_and_name() {
        let category = LookupTool::by_category(book(), 3);
        let result = category.execute(json!({"category": "breakfast"})).await.unwrap();
        assert_eq!(result["recipes"][0]["name"], "Classic Pancakes");

        let name = LookupTool::by_name(book(), 3);
        let result = name.execute(json!({"name": "taco"})).await.unwrap();
        assert_eq!(result["recipes"][0]["name"], "Beef Tacos");
    }

    #[tokio::test]
    async fn test_absent_ingredient_is_empty_not_error() {
        let tool = LookupTool::by_ingredient(book(), 3);
        let result = tool.execute(json!({"ingredient": "durian"})).await.unwrap();
        assert_eq!(result["total_matches"], 0);
        assert_eq!(result["recipes"], json!([]));
    }

    #[tokio::test]
    async fn test_missing_argument() {
        let tool = LookupTool::by_name(book(), 3);
        let err = tool.execute(json!({})).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::MissingArgument {
                argument: "name".to_string()
            }
        );
        assert!(tool.parameters().validate(json!({})).is_err());
    }
}
