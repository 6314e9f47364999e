//! Recipe tools exposed to the hosted model

pub mod format;
mod lookup;
mod nutrition;
mod search;

pub use lookup::LookupTool;
pub use nutrition::NutritionTool;
pub use search::SearchRecipesTool;

use crate::dataset::RecipeBook;
use crate::error::Result;
use pantry_tools::ToolRegistry;
use std::sync::Arc;

/// Build the registry of every recipe tool, in a stable order
pub fn recipe_tools(book: Arc<RecipeBook>, max_results: usize) -> Result<ToolRegistry> {
    let registry = ToolRegistry::builder()
        .register(Arc::new(SearchRecipesTool::new(Arc::clone(&book), max_results)))
        .register(Arc::new(LookupTool::by_ingredient(Arc::clone(&book), max_results)))
        .register(Arc::new(LookupTool::by_category(Arc::clone(&book), max_results)))
        .register(Arc::new(LookupTool::by_name(Arc::clone(&book), max_results)))
        .register(Arc::new(NutritionTool::new(book)))
        .build()?;
    Ok(registry)
}
