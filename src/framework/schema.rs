//! Resource schema declaration
//!
//! Each resource declares its attributes with a primitive type, a presence
//! mode (required, optional or computed) and optional validation and
//! diff-suppression callbacks.

use crate::error::{ProviderError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Primitive attribute types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Bool,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
        }
    }

    /// Check that a JSON value holds this type
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Int => value.as_i64().is_some(),
            Self::Bool => value.is_boolean(),
        }
    }
}

/// Validates a configured value; receives the attribute name for messages
pub type ValidateFn = fn(&Value, &str) -> Result<()>;

/// Returns true when `old` and `new` should be treated as equal
pub type DiffSuppressFn = fn(&str, &str) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
    Computed,
}

/// A single attribute declaration
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub ty: FieldType,
    pub presence: Presence,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip)]
    pub validate: Option<ValidateFn>,
    #[serde(skip)]
    pub diff_suppress: Option<DiffSuppressFn>,
}

impl Field {
    fn with_presence(ty: FieldType, presence: Presence) -> Self {
        Self {
            ty,
            presence,
            force_new: false,
            default: None,
            description: None,
            validate: None,
            diff_suppress: None,
        }
    }

    pub fn required(ty: FieldType) -> Self {
        Self::with_presence(ty, Presence::Required)
    }

    pub fn optional(ty: FieldType) -> Self {
        Self::with_presence(ty, Presence::Optional)
    }

    pub fn computed(ty: FieldType) -> Self {
        Self::with_presence(ty, Presence::Computed)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Changing this attribute replaces the resource
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn validate_with(mut self, f: ValidateFn) -> Self {
        self.validate = Some(f);
        self
    }

    pub fn suppress_diff_with(mut self, f: DiffSuppressFn) -> Self {
        self.diff_suppress = Some(f);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn is_computed(&self) -> bool {
        self.presence == Presence::Computed
    }
}

/// Attribute declarations for one resource type
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    fields: BTreeMap<&'static str, Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, field: Field) -> Self {
        self.fields.insert(name, field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Field)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    /// Normalize configured attributes against the schema.
    ///
    /// Rejects unknown attributes, values for computed attributes, missing
    /// required attributes and wrong types, fills defaults for absent
    /// optional attributes and runs per-field validators.
    pub fn check_config(&self, config: &Map<String, Value>) -> Result<Map<String, Value>> {
        for key in config.keys() {
            match self.fields.get(key.as_str()) {
                None => {
                    return Err(ProviderError::validation(
                        key.clone(),
                        "unsupported argument",
                    ))
                }
                Some(field) if field.is_computed() => {
                    return Err(ProviderError::validation(
                        key.clone(),
                        "value is computed and cannot be configured",
                    ))
                }
                Some(_) => {}
            }
        }

        let mut normalized = Map::new();
        for (name, field) in self.iter() {
            let value = match config.get(name) {
                Some(Value::Null) | None => match (&field.default, field.presence) {
                    (Some(default), _) => default.clone(),
                    (None, Presence::Required) => {
                        return Err(ProviderError::validation(
                            name,
                            "required argument is missing",
                        ))
                    }
                    (None, _) => continue,
                },
                Some(value) => value.clone(),
            };

            if !field.ty.accepts(&value) {
                return Err(ProviderError::invalid_type(name, field.ty.as_str()));
            }
            if let Some(validate) = field.validate {
                validate(&value, name)?;
            }
            normalized.insert(name.to_string(), value);
        }

        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .field("config_id", Field::required(FieldType::Int))
            .field("note", Field::optional(FieldType::String).default_value(""))
            .field("flag", Field::optional(FieldType::Bool))
            .field("output_text", Field::computed(FieldType::String))
    }

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let normalized = schema().check_config(&obj(json!({"config_id": 1}))).unwrap();
        assert_eq!(normalized["note"], json!(""));
        assert!(!normalized.contains_key("flag"));
    }

    #[test]
    fn test_required_missing() {
        let err = schema().check_config(&Map::new()).unwrap_err();
        assert!(err.to_string().contains("config_id"));
    }

    #[test]
    fn test_wrong_type() {
        let err = schema()
            .check_config(&obj(json!({"config_id": "abc"})))
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidType { .. }));
    }

    #[test]
    fn test_computed_not_configurable() {
        let err = schema()
            .check_config(&obj(json!({"config_id": 1, "output_text": "x"})))
            .unwrap_err();
        assert!(err.to_string().contains("computed"));
    }

    #[test]
    fn test_unknown_argument() {
        let err = schema()
            .check_config(&obj(json!({"config_id": 1, "bogus": true})))
            .unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn test_validator_runs() {
        fn positive(value: &Value, name: &str) -> Result<()> {
            match value.as_i64() {
                Some(v) if v > 0 => Ok(()),
                _ => Err(ProviderError::validation(name, "must be positive")),
            }
        }
        let schema = Schema::new().field(
            "config_id",
            Field::required(FieldType::Int).validate_with(positive),
        );
        assert!(schema.check_config(&obj(json!({"config_id": 5}))).is_ok());
        assert!(schema.check_config(&obj(json!({"config_id": -5}))).is_err());
    }
}
