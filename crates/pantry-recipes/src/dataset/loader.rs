//! Dataset decoding: CSV, JSON and JSON Lines into [`Recipe`] records

use super::parse;
use super::recipe::{Nutrition, Recipe};
use crate::error::{RecipeError, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// On-disk layout of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    /// A single JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
}

impl DatasetFormat {
    /// Detect the format from a path or object name
    pub fn from_path(path: &str) -> Result<Self> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let extension = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "parquet" => Err(RecipeError::UnsupportedFormat(
                "parquet is not supported; export the dataset as CSV or JSON".to_string(),
            )),
            _ => Err(RecipeError::UnsupportedFormat(format!(
                "cannot infer format of '{path}' (expected .csv, .json or .jsonl)"
            ))),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("csv"),
            Self::Json => f.write_str("json"),
            Self::JsonLines => f.write_str("jsonl"),
        }
    }
}

/// Decoded records plus the rows that had to be dropped
#[derive(Debug, Default)]
pub struct LoadReport {
    pub recipes: Vec<Recipe>,
    /// Rows without a usable name
    pub skipped: usize,
}

/// Recipe attributes a column can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Id,
    Name,
    Ingredients,
    Category,
    Description,
    Keywords,
    Instructions,
    TotalTime,
    Calories,
    Fat,
    Protein,
    Carbohydrate,
    Sodium,
}

const REQUIRED: [(Field, &str); 3] = [
    (Field::Name, "name"),
    (Field::Ingredients, "ingredients"),
    (Field::Category, "category"),
];

impl Field {
    /// Match a column header, ignoring case, spaces and underscores
    fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        let field = match key.as_str() {
            "recipeid" | "id" => Self::Id,
            "name" | "recipename" | "title" => Self::Name,
            "recipeingredientparts" | "ingredientparts" | "ingredients" => Self::Ingredients,
            "recipecategory" | "category" => Self::Category,
            "description" => Self::Description,
            "keywords" | "tags" => Self::Keywords,
            "recipeinstructions" | "instructions" | "steps" => Self::Instructions,
            "totaltime" | "totalminutes" | "minutes" => Self::TotalTime,
            "calories" => Self::Calories,
            "fatcontent" | "fat" => Self::Fat,
            "proteincontent" | "protein" => Self::Protein,
            "carbohydratecontent" | "carbohydrate" | "carbohydrates" => Self::Carbohydrate,
            "sodiumcontent" | "sodium" => Self::Sodium,
            _ => return None,
        };
        Some(field)
    }
}

type Cells = HashMap<Field, String>;

/// Decode a dataset held in memory
pub fn parse_dataset(bytes: &[u8], format: DatasetFormat) -> Result<LoadReport> {
    let rows = match format {
        DatasetFormat::Csv => csv_rows(bytes)?,
        DatasetFormat::Json => {
            let value: Value = serde_json::from_slice(bytes)?;
            let Value::Array(items) = value else {
                return Err(RecipeError::Parse(
                    "JSON dataset must be an array of objects".to_string(),
                ));
            };
            json_rows(items.into_iter().enumerate())?
        }
        DatasetFormat::JsonLines => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| RecipeError::Parse(format!("dataset is not UTF-8: {e}")))?;
            let mut items = Vec::new();
            for (line_no, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let value: Value = serde_json::from_str(line).map_err(|e| {
                    RecipeError::Parse(format!("line {}: {e}", line_no + 1))
                })?;
                items.push((line_no, value));
            }
            json_rows(items.into_iter())?
        }
    };

    let mut report = LoadReport::default();
    for cells in &rows {
        match build_recipe(cells) {
            Some(recipe) => report.recipes.push(recipe),
            None => report.skipped += 1,
        }
    }

    if report.skipped > 0 {
        warn!(skipped = report.skipped, "Skipped dataset rows without a recipe name");
    }
    debug!(%format, recipes = report.recipes.len(), "Dataset decoded");
    Ok(report)
}

fn csv_rows(bytes: &[u8]) -> Result<Vec<Cells>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let columns: Vec<Option<Field>> = reader.headers()?.iter().map(Field::from_header).collect();
    let present: HashSet<Field> = columns.iter().flatten().copied().collect();
    check_required(&present)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = columns
            .iter()
            .zip(record.iter())
            .filter_map(|(field, cell)| field.map(|f| (f, cell.to_string())))
            .collect();
        rows.push(cells);
    }
    Ok(rows)
}

fn json_rows(items: impl Iterator<Item = (usize, Value)>) -> Result<Vec<Cells>> {
    let mut rows = Vec::new();
    let mut present = HashSet::new();

    for (index, item) in items {
        let Value::Object(object) = item else {
            return Err(RecipeError::Parse(format!("record {index} is not a JSON object")));
        };
        let cells = json_cells(object);
        present.extend(cells.keys().copied());
        rows.push(cells);
    }

    if !rows.is_empty() {
        check_required(&present)?;
    }
    Ok(rows)
}

/// Flatten a JSON object into string cells so every format shares one parser
fn json_cells(object: Map<String, Value>) -> Cells {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let field = Field::from_header(&key)?;
            let cell = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((field, cell))
        })
        .collect()
}

fn check_required(present: &HashSet<Field>) -> Result<()> {
    match REQUIRED.iter().find(|(field, _)| !present.contains(field)) {
        Some((_, name)) => Err(RecipeError::MissingColumn(*name)),
        None => Ok(()),
    }
}

fn build_recipe(cells: &Cells) -> Option<Recipe> {
    let cell = |field| cells.get(&field).map_or("", String::as_str);
    let name = parse::text(cell(Field::Name))?;

    Some(Recipe {
        id: parse::id(cell(Field::Id)),
        name,
        ingredients: parse::list(cell(Field::Ingredients)),
        category: parse::text(cell(Field::Category)).unwrap_or_default(),
        description: parse::text(cell(Field::Description)),
        keywords: parse::list(cell(Field::Keywords)),
        instructions: parse::list(cell(Field::Instructions)),
        total_minutes: parse::minutes(cell(Field::TotalTime)),
        nutrition: Nutrition {
            calories: parse::number(cell(Field::Calories)),
            fat_g: parse::number(cell(Field::Fat)),
            protein_g: parse::number(cell(Field::Protein)),
            carbohydrate_g: parse::number(cell(Field::Carbohydrate)),
            sodium_mg: parse::number(cell(Field::Sodium)),
        },
    })
}
