//! Nutrition facts for a named recipe

use super::format;
use crate::dataset::RecipeBook;
use async_trait::async_trait;
use pantry_tools::{Parameter, ParameterSchema, Tool, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Looks up the first recipe whose name matches and reports its nutrition
pub struct NutritionTool {
    book: Arc<RecipeBook>,
    schema: ParameterSchema,
}

#[derive(Debug, Deserialize)]
struct NutritionParams {
    recipe_name: String,
}

impl NutritionTool {
    /// Create a new nutrition tool
    pub fn new(book: Arc<RecipeBook>) -> Self {
        Self {
            book,
            schema: ParameterSchema::new().param(
                Parameter::string("recipe_name", "Name, or part of the name, of the recipe")
                    .required(),
            ),
        }
    }
}

#[async_trait]
impl Tool for NutritionTool {
    async fn execute(&self, params: Value) -> ToolResult {
        let NutritionParams { recipe_name } =
            serde_json::from_value(params).map_err(|e| ToolError::InvalidRequest {
                message: format!("Invalid parameters: {e}"),
            })?;

        if self.book.is_empty() {
            return Ok(format::no_dataset());
        }

        let Some(recipe) = self.book.find_by_name(&recipe_name) else {
            return Ok(json!({
                "found": false,
                "recipe_name": recipe_name,
                "message": format!("No recipe named '{recipe_name}' was found."),
            }));
        };

        let n = &recipe.nutrition;
        let mut result = json!({
            "found": true,
            "name": recipe.name,
            "nutrition": {
                "calories": n.calories,
                "fat_g": n.fat_g,
                "protein_g": n.protein_g,
                "carbohydrate_g": n.carbohydrate_g,
                "sodium_mg": n.sodium_mg,
            },
        });
        if n.is_empty() {
            result["message"] = json!(format!(
                "'{}' exists but has no nutritional details recorded.",
                recipe.name
            ));
        }
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "get_nutritional_info"
    }

    fn description(&self) -> &'static str {
        "Get calories, fat, protein, carbohydrate and sodium for a recipe, \
         looked up by (part of) its name."
    }

    fn parameters(&self) -> &ParameterSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetFormat, Recipe};

    const FIXTURE: &str = include_str!("../../fixtures/recipes.csv");

    fn tool() -> NutritionTool {
        let book = RecipeBook::from_bytes(FIXTURE.as_bytes(), DatasetFormat::Csv).unwrap();
        NutritionTool::new(Arc::new(book))
    }

    #[tokio::test]
    async fn test_nutrition_found() {
        let result = tool()
            .execute(json!({"recipe_name": "greek salad"}))
            .await
            .unwrap();
        assert_eq!(result["found"], true);
        assert_eq!(result["name"], "Greek Salad");
        assert_eq!(result["nutrition"]["calories"], 210.0);
        assert_eq!(result["nutrition"]["sodium_mg"], 640.0);
        assert!(result.get("message").is_none());
    }

    #[tokio::test]
    async fn test_partial_nutrition() {
        let result = tool()
            .execute(json!({"recipe_name": "banana"}))
            .await
            .unwrap();
        assert!(result["nutrition"]["calories"].is_null());
        assert_eq!(result["nutrition"]["sodium_mg"], 300.0);
    }

    #[tokio::test]
    async fn test_recipe_without_nutrition() {
        let book = RecipeBook::new(vec![Recipe {
            name: "Plain Water".to_string(),
            ..Recipe::default()
        }]);
        let result = NutritionTool::new(Arc::new(book))
            .execute(json!({"recipe_name": "water"}))
            .await
            .unwrap();
        assert!(result["message"].as_str().unwrap().contains("no nutritional details"));
    }

    #[tokio::test]
    async fn test_unknown_recipe() {
        let result = tool()
            .execute(json!({"recipe_name": "beef wellington"}))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
    }
}
