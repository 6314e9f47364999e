//! In-memory recipe dataset
//!
//! The [`RecipeBook`] is loaded once at startup and never mutated, so it is
//! shared between requests behind an `Arc` with no locking. Queries never
//! fail: no match is an empty result.

mod loader;
mod parse;
mod recipe;
mod storage;

pub use loader::{DatasetFormat, LoadReport, parse_dataset};
pub use recipe::{Nutrition, Recipe};
pub use storage::DatasetSource;

use crate::error::Result;
use reqwest::Client;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// A single-criterion lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeQuery {
    /// Case-insensitive substring over each ingredient
    Ingredient(String),
    /// Exact category, ignoring surrounding whitespace and ASCII case
    Category(String),
    /// Case-insensitive substring of the name
    Name(String),
}

/// Combined search criteria; every criterion present must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Each one must match some ingredient
    pub ingredients: Vec<String>,
    pub name: Option<String>,
    /// Substring of the category
    pub category: Option<String>,
    /// Substring of any keyword
    pub cuisine: Option<String>,
    pub max_calories: Option<f64>,
    pub max_sodium: Option<f64>,
    pub max_minutes: Option<u32>,
}

impl RecipeFilter {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
            && self.name.is_none()
            && self.category.is_none()
            && self.cuisine.is_none()
            && self.max_calories.is_none()
            && self.max_sodium.is_none()
            && self.max_minutes.is_none()
    }
}

/// Lowercased filter, prepared once per search
struct Prepared {
    ingredients: Vec<String>,
    name: Option<String>,
    category: Option<String>,
    cuisine: Option<String>,
}

fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

impl Prepared {
    fn new(filter: &RecipeFilter) -> Self {
        let fold_opt = |v: &Option<String>| v.as_deref().map(fold);
        Self {
            ingredients: filter.ingredients.iter().map(String::as_str).map(fold).collect(),
            name: fold_opt(&filter.name),
            category: fold_opt(&filter.category),
            cuisine: fold_opt(&filter.cuisine),
        }
    }

    fn matches(&self, filter: &RecipeFilter, recipe: &Recipe) -> bool {
        let within = |value: Option<f64>, bound: Option<f64>| match bound {
            None => true,
            Some(bound) => value.is_some_and(|v| v <= bound),
        };

        self.ingredients.iter().all(|i| recipe.has_ingredient(i))
            && self.name.as_deref().is_none_or(|n| recipe.name_contains(n))
            && self.category.as_deref().is_none_or(|c| recipe.category_contains(c))
            && self.cuisine.as_deref().is_none_or(|c| recipe.has_keyword(c))
            && within(recipe.nutrition.calories, filter.max_calories)
            && within(recipe.nutrition.sodium_mg, filter.max_sodium)
            && within(
                recipe.total_minutes.map(f64::from),
                filter.max_minutes.map(f64::from),
            )
    }
}

/// The loaded recipe collection
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    /// Wrap already-decoded recipes
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Decode a dataset held in memory
    pub fn from_bytes(bytes: &[u8], format: DatasetFormat) -> Result<Self> {
        let report = parse_dataset(bytes, format)?;
        Ok(Self::new(report.recipes))
    }

    /// Fetch and decode a dataset
    pub async fn load(source: &DatasetSource, client: &Client) -> Result<Self> {
        let format = source.format()?;
        let bytes = source.fetch(client).await?;
        let report = parse_dataset(&bytes, format)?;
        let book = Self::new(report.recipes);

        if book.is_empty() {
            warn!(%source, "Dataset loaded but contains no recipes");
        } else {
            info!(
                %source,
                %format,
                recipes = book.len(),
                skipped = report.skipped,
                categories = book.categories().len(),
                "Recipe dataset loaded"
            );
        }
        Ok(book)
    }

    /// Number of recipes
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Whether no recipes are loaded
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// All recipes, in dataset order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Run a single-criterion query
    ///
    /// Blank parameters match nothing.
    pub fn query(&self, query: &RecipeQuery) -> Vec<&Recipe> {
        match query {
            RecipeQuery::Ingredient(ingredient) => self.by_ingredient(ingredient),
            RecipeQuery::Category(category) => self.by_category(category),
            RecipeQuery::Name(name) => self.by_name(name),
        }
    }

    /// Recipes with an ingredient containing `ingredient`
    pub fn by_ingredient(&self, ingredient: &str) -> Vec<&Recipe> {
        let needle = fold(ingredient);
        if needle.is_empty() {
            return Vec::new();
        }
        self.recipes.iter().filter(|r| r.has_ingredient(&needle)).collect()
    }

    /// Recipes whose category is exactly `category`
    pub fn by_category(&self, category: &str) -> Vec<&Recipe> {
        let wanted = category.trim();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.recipes
            .iter()
            .filter(|r| r.category.trim().eq_ignore_ascii_case(wanted))
            .collect()
    }

    /// Recipes whose name contains `name`
    pub fn by_name(&self, name: &str) -> Vec<&Recipe> {
        let needle = fold(name);
        if needle.is_empty() {
            return Vec::new();
        }
        self.recipes.iter().filter(|r| r.name_contains(&needle)).collect()
    }

    /// Recipes satisfying every criterion of `filter`
    ///
    /// A recipe without a value for a numeric field never satisfies a bound
    /// on it. An empty filter matches everything.
    pub fn search(&self, filter: &RecipeFilter) -> Vec<&Recipe> {
        let prepared = Prepared::new(filter);
        self.recipes
            .iter()
            .filter(|r| prepared.matches(filter, r))
            .collect()
    }

    /// First recipe whose name contains `name`
    pub fn find_by_name(&self, name: &str) -> Option<&Recipe> {
        let needle = fold(name);
        if needle.is_empty() {
            return None;
        }
        self.recipes.iter().find(|r| r.name_contains(&needle))
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<&str> {
        self.recipes
            .iter()
            .map(|r| r.category.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = include_str!("../../fixtures/recipes.csv");

    fn book() -> RecipeBook {
        RecipeBook::from_bytes(FIXTURE.as_bytes(), DatasetFormat::Csv).unwrap()
    }

    fn names(recipes: &[&Recipe]) -> Vec<String> {
        recipes.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_by_ingredient() {
        let book = book();
        let chicken = book.query(&RecipeQuery::Ingredient("Chicken".to_string()));
        assert_eq!(
            names(&chicken),
            vec![
                "Chicken Fried Rice",
                "Chicken and Rice Casserole",
                "Thai Green Curry with Chicken",
                "Mushroom Risotto",
            ]
        );
        assert!(book.by_ingredient("saffron").is_empty());
        assert!(book.by_ingredient("  ").is_empty());
    }

    #[test]
    fn test_by_category_is_exact() {
        let book = book();
        assert_eq!(names(&book.by_category(" asian ")), vec!["Chicken Fried Rice"]);
        assert!(book.by_category("Asia").is_empty());
        assert_eq!(book.query(&RecipeQuery::Category("DESSERT".to_string())).len(), 1);
    }

    #[test]
    fn test_by_name() {
        let book = book();
        assert_eq!(book.by_name("rice").len(), 2);
        assert_eq!(
            names(&book.query(&RecipeQuery::Name("cookie".to_string()))),
            vec!["Chocolate Chip Cookies"]
        );
        assert!(book.by_name("").is_empty());
    }

    #[test]
    fn test_search_conjunction() {
        let book = book();
        let filter = RecipeFilter {
            ingredients: vec!["chicken".to_string(), "rice".to_string()],
            max_calories: Some(600.0),
            ..RecipeFilter::default()
        };
        assert_eq!(
            names(&book.search(&filter)),
            vec!["Chicken Fried Rice", "Mushroom Risotto"]
        );

        let filter = RecipeFilter {
            cuisine: Some("italian".to_string()),
            max_minutes: Some(30),
            ..RecipeFilter::default()
        };
        assert_eq!(names(&book.search(&filter)), vec!["Lemon Garlic Shrimp Pasta"]);

        let filter = RecipeFilter {
            category: Some("asia".to_string()),
            max_sodium: Some(1000.0),
            ..RecipeFilter::default()
        };
        assert_eq!(names(&book.search(&filter)), vec!["Chicken Fried Rice"]);
    }

    #[test]
    fn test_missing_numbers_fail_bounds() {
        let book = book();
        let filter = RecipeFilter {
            name: Some("banana".to_string()),
            max_calories: Some(5000.0),
            ..RecipeFilter::default()
        };
        assert!(book.search(&filter).is_empty());

        let filter = RecipeFilter {
            name: Some("chickpea".to_string()),
            max_minutes: Some(600),
            ..RecipeFilter::default()
        };
        assert!(book.search(&filter).is_empty());
    }

    #[test]
    fn test_find_by_name_and_categories() {
        let book = book();
        assert_eq!(
            book.find_by_name("greek").map(|r| r.name.as_str()),
            Some("Greek Salad")
        );
        assert!(book.find_by_name("lasagne").is_none());

        let categories = book.categories();
        assert_eq!(categories.len(), 12);
        assert_eq!(categories.first(), Some(&"Asian"));
        assert!(categories.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_book() {
        let book = RecipeBook::default();
        assert!(book.is_empty());
        assert!(book.by_ingredient("rice").is_empty());
        assert!(book.search(&RecipeFilter::default()).is_empty());
        assert!(RecipeFilter::default().is_empty());
    }
}
