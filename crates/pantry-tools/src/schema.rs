//! Parameter schemas for tools
//!
//! A [`ParameterSchema`] is the single source of truth for a tool's inputs:
//! it renders the JSON Schema shown to the model and validates whatever the
//! model sends back.

use crate::ToolError;
use serde_json::{Map, Number, Value, json};

/// Primitive parameter types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Non-blank string
    String,
    /// Whole number
    Integer,
    /// Any number
    Number,
    /// true / false
    Boolean,
    /// Array of non-blank strings
    StringArray,
}

impl ParamType {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::StringArray => "array",
        }
    }
}

/// A single named parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    param_type: ParamType,
    description: String,
    required: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

impl Parameter {
    fn new(name: impl Into<String>, param_type: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    /// String parameter
    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::String, description)
    }

    /// Integer parameter
    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer, description)
    }

    /// Number parameter
    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number, description)
    }

    /// Boolean parameter
    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean, description)
    }

    /// Array-of-strings parameter
    pub fn string_array(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, ParamType::StringArray, description)
    }

    /// Mark the parameter as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Lower bound for numbers, minimum length for string arrays
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Upper bound for numbers, maximum length for string arrays
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type
    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Whether the parameter must be present
    pub fn is_required(&self) -> bool {
        self.required
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = json!({
            "type": self.param_type.json_type(),
            "description": self.description,
        });
        if self.param_type == ParamType::StringArray {
            schema["items"] = json!({ "type": "string" });
            if let Some(min) = self.minimum {
                schema["minItems"] = json!(min as u64);
            }
            if let Some(max) = self.maximum {
                schema["maxItems"] = json!(max as u64);
            }
        } else {
            if let Some(min) = self.minimum {
                schema["minimum"] = json!(min);
            }
            if let Some(max) = self.maximum {
                schema["maximum"] = json!(max);
            }
        }
        schema
    }

    /// Check one present, non-null value and return its normalised form
    fn check(&self, value: Value) -> Result<Value, ToolError> {
        let name = self.name.as_str();
        match self.param_type {
            ParamType::String => match value {
                Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s.trim().to_string())),
                Value::String(_) => Err(ToolError::invalid(name, "must not be blank")),
                other => Err(type_error(name, "a string", &other)),
            },
            ParamType::Boolean => match value {
                Value::Bool(_) => Ok(value),
                other => Err(type_error(name, "a boolean", &other)),
            },
            ParamType::Number => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| type_error(name, "a number", &value))?;
                self.check_bounds(n)?;
                Ok(value)
            }
            ParamType::Integer => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| type_error(name, "an integer", &value))?;
                if n.fract() != 0.0 {
                    return Err(ToolError::invalid(name, format!("must be a whole number, got {n}")));
                }
                self.check_bounds(n)?;
                // 5.0 -> 5 so typed deserialisation into integers succeeds
                Ok(if n < 0.0 {
                    Value::Number(Number::from(n as i64))
                } else {
                    Value::Number(Number::from(n as u64))
                })
            }
            ParamType::StringArray => {
                let Value::Array(items) = value else {
                    return Err(type_error(name, "an array of strings", &value));
                };
                let mut cleaned = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    match item {
                        Value::String(s) if !s.trim().is_empty() => {
                            cleaned.push(Value::String(s.trim().to_string()));
                        }
                        Value::String(_) => {
                            return Err(ToolError::invalid(name, format!("item {i} must not be blank")));
                        }
                        other => {
                            return Err(ToolError::invalid(
                                name,
                                format!("item {i} must be a string, got {}", describe(&other)),
                            ));
                        }
                    }
                }
                let len = cleaned.len() as f64;
                if self.minimum.is_some_and(|min| len < min) {
                    return Err(ToolError::invalid(
                        name,
                        format!("needs at least {} item(s)", self.minimum.unwrap_or_default()),
                    ));
                }
                if self.maximum.is_some_and(|max| len > max) {
                    return Err(ToolError::invalid(
                        name,
                        format!("accepts at most {} item(s)", self.maximum.unwrap_or_default()),
                    ));
                }
                Ok(Value::Array(cleaned))
            }
        }
    }

    fn check_bounds(&self, n: f64) -> Result<(), ToolError> {
        if let Some(min) = self.minimum {
            if n < min {
                return Err(ToolError::invalid(&self.name, format!("must be at least {min}, got {n}")));
            }
        }
        if let Some(max) = self.maximum {
            if n > max {
                return Err(ToolError::invalid(&self.name, format!("must be at most {max}, got {n}")));
            }
        }
        Ok(())
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> ToolError {
    ToolError::invalid(name, format!("must be {expected}, got {}", describe(got)))
}

/// The full set of parameters a tool accepts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    params: Vec<Parameter>,
}

impl ParameterSchema {
    /// Create an empty schema (a tool without arguments)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Declared parameters, in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    /// Render as a JSON Schema object for the model
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), p.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validate arguments from the model and return them normalised
    ///
    /// `null` counts as an empty object. Unknown keys are rejected, null
    /// optional values are dropped, strings are trimmed and integral floats
    /// become integers.
    pub fn validate(&self, args: Value) -> Result<Value, ToolError> {
        let mut provided = match args {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            Value::String(raw) => {
                return Err(ToolError::InvalidRequest {
                    message: format!("arguments must be a JSON object, got unparseable text: {raw}"),
                });
            }
            other => {
                return Err(ToolError::InvalidRequest {
                    message: format!("arguments must be a JSON object, got {}", describe(&other)),
                });
            }
        };

        if let Some(unknown) = provided
            .keys()
            .find(|key| !self.params.iter().any(|p| &p.name == *key))
        {
            let known: Vec<&str> = self.params.iter().map(|p| p.name.as_str()).collect();
            return Err(ToolError::invalid(
                unknown.clone(),
                format!("unknown argument (expected one of: {})", known.join(", ")),
            ));
        }

        let mut normalised = Map::new();
        for param in &self.params {
            match provided.remove(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(ToolError::MissingArgument {
                            argument: param.name.clone(),
                        });
                    }
                }
                Some(value) => {
                    normalised.insert(param.name.clone(), param.check(value)?);
                }
            }
        }

        Ok(Value::Object(normalised))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_schema() -> ParameterSchema {
        ParameterSchema::new()
            .param(Parameter::string_array("ingredients", "Ingredients").minimum(1.0).maximum(3.0))
            .param(Parameter::string("category", "Category"))
            .param(Parameter::number("max_calories", "Calorie cap").minimum(0.0))
            .param(Parameter::integer("limit", "How many").minimum(1.0).maximum(10.0))
            .param(Parameter::boolean("vegetarian", "Meat-free only"))
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = ParameterSchema::new()
            .param(Parameter::string("ingredient", "An ingredient").required())
            .param(Parameter::integer("limit", "How many").minimum(1.0))
            .to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["ingredient"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["minimum"], 1.0);
        assert_eq!(schema["required"], json!(["ingredient"]));
    }

    #[test]
    fn test_array_schema_has_items() {
        let schema = search_schema().to_json_schema();
        let ingredients = &schema["properties"]["ingredients"];
        assert_eq!(ingredients["type"], "array");
        assert_eq!(ingredients["items"]["type"], "string");
        assert_eq!(ingredients["minItems"], 1);
    }

    #[test]
    fn test_missing_required_argument() {
        let schema = ParameterSchema::new().param(Parameter::string("name", "Name").required());

        assert_eq!(
            schema.validate(json!({})).unwrap_err(),
            ToolError::MissingArgument {
                argument: "name".to_string()
            }
        );
        assert!(matches!(
            schema.validate(json!({"name": null})),
            Err(ToolError::MissingArgument { .. })
        ));
        assert!(matches!(
            schema.validate(Value::Null),
            Err(ToolError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let err = search_schema()
            .validate(json!({"category": 12}))
            .unwrap_err();
        assert_eq!(err, ToolError::invalid("category", "must be a string, got a number"));
    }

    #[test]
    fn test_unknown_argument_rejected() {
        let err = search_schema().validate(json!({"cuisine": "thai"})).unwrap_err();
        match err {
            ToolError::InvalidArgument { argument, reason } => {
                assert_eq!(argument, "cuisine");
                assert!(reason.contains("ingredients"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalisation() {
        let normalised = search_schema()
            .validate(json!({
                "ingredients": [" chicken ", "rice"],
                "category": "  Asian ",
                "limit": 5.0,
                "max_calories": null,
                "vegetarian": false
            }))
            .unwrap();

        assert_eq!(normalised["ingredients"], json!(["chicken", "rice"]));
        assert_eq!(normalised["category"], "Asian");
        assert_eq!(normalised["limit"], json!(5));
        assert!(normalised["limit"].is_u64());
        assert!(normalised.get("max_calories").is_none());
        assert_eq!(normalised["vegetarian"], false);
    }

    #[test]
    fn test_bounds_enforced() {
        let schema = search_schema();
        assert!(schema.validate(json!({"limit": 0})).is_err());
        assert!(schema.validate(json!({"limit": 11})).is_err());
        assert!(schema.validate(json!({"limit": 2.5})).is_err());
        assert!(schema.validate(json!({"max_calories": -1})).is_err());
        assert!(schema.validate(json!({"ingredients": []})).is_err());
        assert!(schema.validate(json!({"ingredients": ["a", "b", "c", "d"]})).is_err());
    }

    #[test]
    fn test_blank_strings_rejected() {
        let schema = search_schema();
        assert!(schema.validate(json!({"category": "   "})).is_err());
        assert!(schema.validate(json!({"ingredients": ["rice", ""]})).is_err());
        assert!(schema.validate(json!({"ingredients": ["rice", 3]})).is_err());
    }

    #[test]
    fn test_non_object_arguments() {
        let schema = search_schema();
        assert!(matches!(
            schema.validate(json!("{broken")),
            Err(ToolError::InvalidRequest { .. })
        ));
        assert!(matches!(
            schema.validate(json!([1, 2])),
            Err(ToolError::InvalidRequest { .. })
        ));
    }
}
