//! Resource record
//!
//! The local view of one managed entity: its identity plus attribute values.
//! Handlers only read and write individual attributes; the record itself is
//! owned by whoever drives the lifecycle.

use super::schema::Schema;
use crate::error::{ProviderError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<Schema>,
    id: String,
    values: Map<String, Value>,
    /// Attribute values before the pending change (empty on create)
    prior: Map<String, Value>,
}

impl ResourceData {
    /// Build a record from configured attributes, validating them against the schema
    pub fn from_config(schema: Arc<Schema>, config: &Map<String, Value>) -> Result<Self> {
        let values = schema.check_config(config)?;
        Ok(Self {
            schema,
            id: String::new(),
            values,
            prior: Map::new(),
        })
    }

    /// Rebuild a record from persisted state without validation
    pub fn from_state(schema: Arc<Schema>, id: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            schema,
            id: id.into(),
            values,
            prior: Map::new(),
        }
    }

    /// Record an update: `self` carries the desired values, `prior` the stored ones
    pub fn with_prior(mut self, id: impl Into<String>, prior: Map<String, Value>) -> Self {
        self.id = id.into();
        // Computed attributes are never configured; carry them over.
        for (name, field) in self.schema.iter() {
            if field.is_computed() {
                if let Some(value) = prior.get(name) {
                    self.values.insert(name.to_string(), value.clone());
                }
            }
        }
        self.prior = prior;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource as gone
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Stored attribute values the pending change started from
    pub fn prior(&self) -> &Map<String, Value> {
        &self.prior
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        self.get_opt_string(key)?
            .ok_or_else(|| ProviderError::NotFound(key.to_string()))
    }

    pub fn get_opt_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ProviderError::invalid_type(key, "string")),
        }
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_opt_int(key)?
            .ok_or_else(|| ProviderError::NotFound(key.to_string()))
    }

    pub fn get_opt_int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| ProviderError::invalid_type(key, "int")),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Err(ProviderError::NotFound(key.to_string())),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(ProviderError::invalid_type(key, "bool")),
        }
    }

    /// Write an attribute; the schema must declare it with a matching type
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let Some(field) = self.schema.get(key) else {
            return Err(ProviderError::ValueSet {
                field: key.to_string(),
                reason: "attribute not declared in schema".to_string(),
            });
        };
        if !value.is_null() && !field.ty.accepts(&value) {
            return Err(ProviderError::ValueSet {
                field: key.to_string(),
                reason: format!("expected {}", field.ty.as_str()),
            });
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// True when the desired value differs from the stored one
    pub fn has_change(&self, key: &str) -> bool {
        let (old, new) = self.get_change(key);
        old != new
    }

    pub fn get_change(&self, key: &str) -> (Option<&Value>, Option<&Value>) {
        (
            self.prior.get(key).filter(|v| !v.is_null()),
            self.get(key),
        )
    }
}
