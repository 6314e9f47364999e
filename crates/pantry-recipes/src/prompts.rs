//! System prompt for the recipe assistant

use crate::dataset::RecipeBook;
use crate::error::Result;
use minijinja::{Environment, context};
use pantry_llm::ToolDefinition;

/// Categories listed in the prompt before it is cut off
const MAX_LISTED_CATEGORIES: usize = 40;

const SYSTEM_TEMPLATE: &str = r"You are a friendly cooking assistant answering questions about a recipe collection.

{% if recipe_count > 0 -%}
The collection holds {{ recipe_count }} recipes.
{%- if categories %} Categories include: {{ categories | join(', ') }}{% if more_categories > 0 %} and {{ more_categories }} more{% endif %}.{% endif %}
{%- else -%}
No recipes are loaded right now. Say so politely if the user asks about recipes.
{%- endif %}

You can look things up with these tools:
{% for tool in tools -%}
- {{ tool.name }}: {{ tool.description }}
{% endfor %}
Rules:
1. Always use a tool before naming or describing a recipe. Never invent recipes, ingredients or nutrition values.
2. For questions with several requirements (two ingredients, a calorie limit, a cuisine), prefer search_recipes with every criterion at once.
3. If a tool reports an error, fix the arguments and try again. If nothing matches, say so and suggest loosening the criteria.
4. Mention recipe names exactly as the tools return them.

If the answer needs more than a sentence or two, format it in Markdown, using:
 - headings (#, ##, etc.)
 - bold (**bold**)
 - italics (*italics*)
 - bullet lists (- item)
 - numbered lists (1., 2., 3.)
";

/// Render the system prompt for a dataset and tool set
pub fn system_prompt(book: &RecipeBook, tools: &[ToolDefinition]) -> Result<String> {
    let categories = book.categories();
    let more_categories = categories.len().saturating_sub(MAX_LISTED_CATEGORIES);
    let listed: Vec<&str> = categories.into_iter().take(MAX_LISTED_CATEGORIES).collect();
    let tools: Vec<_> = tools
        .iter()
        .map(|t| context! { name => &t.name, description => &t.description })
        .collect();

    let env = Environment::new();
    let prompt = env.render_str(
        SYSTEM_TEMPLATE,
        context! {
            recipe_count => book.len(),
            categories => listed,
            more_categories => more_categories,
            tools => tools,
        },
    )?;
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetFormat, Recipe};
    use serde_json::json;

    fn tools() -> Vec<ToolDefinition> {
        vec![ToolDefinition::new(
            "find_recipes_by_ingredient",
            "Find recipes that use an ingredient.",
            json!({"type": "object"}),
        )]
    }

    #[test]
    fn test_prompt_describes_dataset_and_tools() {
        let book = RecipeBook::from_bytes(
            include_str!("../fixtures/recipes.csv").as_bytes(),
            DatasetFormat::Csv,
        )
        .unwrap();
        let prompt = system_prompt(&book, &tools()).unwrap();

        assert!(prompt.contains("The collection holds 12 recipes."));
        assert!(prompt.contains("Asian, Breakfast, Curries"));
        assert!(prompt.contains("- find_recipes_by_ingredient: Find recipes that use an ingredient."));
        assert!(prompt.contains("**bold**"));
        assert!(!prompt.contains("more."));
    }

    #[test]
    fn test_prompt_for_empty_dataset() {
        let prompt = system_prompt(&RecipeBook::default(), &tools()).unwrap();
        assert!(prompt.contains("No recipes are loaded"));
        assert!(!prompt.contains("The collection holds"));
    }

    #[test]
    fn test_long_category_lists_are_cut() {
        let recipes = (0..45)
            .map(|i| Recipe {
                name: format!("Dish {i}"),
                category: format!("Category {i:02}"),
                ..Recipe::default()
            })
            .collect();
        let prompt = system_prompt(&RecipeBook::new(recipes), &[]).unwrap();
        assert!(prompt.contains("Category 39 and 5 more."));
        assert!(!prompt.contains("Category 40"));
    }
}
