//! Shaping recipe matches into compact tool results

use crate::dataset::Recipe;
use pantry_utils::truncate_chars;
use serde_json::{Value, json};

const MAX_KEYWORDS: usize = 3;
const MAX_INGREDIENTS: usize = 5;
const MAX_INSTRUCTION_CHARS: usize = 200;

/// A recipe cut down to what the model needs to answer
pub fn summarize(recipe: &Recipe) -> Value {
    let mut summary = json!({
        "name": recipe.name,
        "category": recipe.category,
        "calories": recipe.nutrition.calories,
        "sodium_mg": recipe.nutrition.sodium_mg,
        "total_minutes": recipe.total_minutes,
        "keywords": recipe.keywords.iter().take(MAX_KEYWORDS).collect::<Vec<_>>(),
        "ingredients": recipe.ingredients.iter().take(MAX_INGREDIENTS).collect::<Vec<_>>(),
    });

    if recipe.ingredients.len() > MAX_INGREDIENTS {
        summary["more_ingredients"] = json!(recipe.ingredients.len() - MAX_INGREDIENTS);
    }
    if !recipe.instructions.is_empty() {
        summary["instructions"] = json!(truncate_chars(
            &recipe.instructions_text(),
            MAX_INSTRUCTION_CHARS
        ));
    }
    summary
}

/// Result payload for a list of matches
///
/// `criteria` echoes what was searched for so the model can phrase its
/// answer, and `more` tells it how many matches were left out.
pub fn matches(criteria: Value, found: &[&Recipe], max_results: usize) -> Value {
    if found.is_empty() {
        return json!({
            "criteria": criteria,
            "total_matches": 0,
            "shown": 0,
            "recipes": [],
            "message": "No recipes found matching these criteria.",
        });
    }

    let shown: Vec<Value> = found.iter().take(max_results).map(|r| summarize(r)).collect();
    json!({
        "criteria": criteria,
        "total_matches": found.len(),
        "shown": shown.len(),
        "recipes": shown,
        "more": found.len().saturating_sub(max_results),
    })
}

/// Result payload when no dataset is loaded
pub fn no_dataset() -> Value {
    json!({
        "total_matches": 0,
        "message": "No recipes are loaded at the moment, so nothing can be looked up.",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Nutrition;

    fn recipe(name: &str, ingredients: usize) -> Recipe {
        Recipe {
            name: name.to_string(),
            category: "Soups".to_string(),
            ingredients: (1..=ingredients).map(|i| format!("item {i}")).collect(),
            keywords: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            instructions: vec!["x".repeat(150), "y".repeat(150)],
            total_minutes: Some(30),
            nutrition: Nutrition {
                calories: Some(250.0),
                ..Nutrition::default()
            },
            ..Recipe::default()
        }
    }

    #[test]
    fn test_summary_is_trimmed() {
        let summary = summarize(&recipe("Leek Soup", 7));
        assert_eq!(summary["name"], "Leek Soup");
        assert_eq!(summary["keywords"], json!(["A", "B", "C"]));
        assert_eq!(summary["ingredients"].as_array().unwrap().len(), 5);
        assert_eq!(summary["more_ingredients"], 2);
        assert_eq!(summary["calories"], 250.0);
        assert!(summary["sodium_mg"].is_null());

        let instructions = summary["instructions"].as_str().unwrap();
        assert_eq!(instructions.chars().count(), 203);
        assert!(instructions.ends_with("..."));
    }

    #[test]
    fn test_matches_caps_results() {
        let recipes: Vec<Recipe> = (0..5).map(|i| recipe(&format!("Soup {i}"), 2)).collect();
        let found: Vec<&Recipe> = recipes.iter().collect();

        let payload = matches(json!({"category": "Soups"}), &found, 3);
        assert_eq!(payload["total_matches"], 5);
        assert_eq!(payload["shown"], 3);
        assert_eq!(payload["more"], 2);
        assert_eq!(payload["recipes"][2]["name"], "Soup 2");
        assert!(payload["recipes"][0].get("more_ingredients").is_none());
    }

    #[test]
    fn test_no_matches() {
        let payload = matches(json!({"ingredient": "saffron"}), &[], 3);
        assert_eq!(payload["total_matches"], 0);
        assert_eq!(payload["criteria"]["ingredient"], "saffron");
        assert!(payload["message"].as_str().unwrap().contains("No recipes"));
    }
}
