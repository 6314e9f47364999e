//! Recipe records

use serde::{Deserialize, Serialize};

/// Per-serving nutrition facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: Option<f64>,
    pub fat_g: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbohydrate_g: Option<f64>,
    pub sodium_mg: Option<f64>,
}

impl Nutrition {
    /// True when no nutrition field is known
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.fat_g.is_none()
            && self.protein_g.is_none()
            && self.carbohydrate_g.is_none()
            && self.sodium_mg.is_none()
    }
}

/// One row of the recipe dataset
///
/// Records are immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Option<u64>,
    pub name: String,
    /// Ingredient names, in recipe order
    pub ingredients: Vec<String>,
    pub category: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    /// Instruction steps, in order
    pub instructions: Vec<String>,
    pub total_minutes: Option<u32>,
    pub nutrition: Nutrition,
}

impl Recipe {
    /// Any ingredient contains `needle` (expected lowercase)
    pub(crate) fn has_ingredient(&self, needle: &str) -> bool {
        self.ingredients.iter().any(|i| contains_folded(i, needle))
    }

    /// Any keyword contains `needle` (expected lowercase)
    pub(crate) fn has_keyword(&self, needle: &str) -> bool {
        self.keywords.iter().any(|k| contains_folded(k, needle))
    }

    /// The name contains `needle` (expected lowercase)
    pub(crate) fn name_contains(&self, needle: &str) -> bool {
        contains_folded(&self.name, needle)
    }

    /// The category contains `needle` (expected lowercase)
    pub(crate) fn category_contains(&self, needle: &str) -> bool {
        contains_folded(&self.category, needle)
    }

    /// Instruction steps joined into one paragraph
    pub fn instructions_text(&self) -> String {
        self.instructions.join(" ")
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        Recipe {
            name: "Chicken Fried Rice".to_string(),
            ingredients: vec!["Chicken Breast".to_string(), "cooked rice".to_string()],
            category: "Asian".to_string(),
            keywords: vec!["Easy".to_string(), "< 30 Mins".to_string()],
            instructions: vec!["Heat the wok.".to_string(), "Fry.".to_string()],
            ..Recipe::default()
        }
    }

    #[test]
    fn test_case_insensitive_matching() {
        let recipe = recipe();
        assert!(recipe.has_ingredient("chicken"));
        assert!(recipe.has_ingredient("rice"));
        assert!(!recipe.has_ingredient("beef"));
        assert!(recipe.name_contains("fried"));
        assert!(recipe.has_keyword("30 mins"));
        assert!(recipe.category_contains("asia"));
    }

    #[test]
    fn test_instructions_text() {
        assert_eq!(recipe().instructions_text(), "Heat the wok. Fry.");
    }

    #[test]
    fn test_empty_nutrition() {
        assert!(Nutrition::default().is_empty());
        let nutrition = Nutrition {
            sodium_mg: Some(120.0),
            ..Nutrition::default()
        };
        assert!(!nutrition.is_empty());
    }
}
