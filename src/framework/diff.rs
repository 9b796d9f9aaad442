//! Planning: compare stored attributes with desired ones

use super::schema::Schema;
use serde::Serialize;
use serde_json::{Map, Value};

/// One attribute that differs between stored and desired state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    pub name: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub requires_replace: bool,
}

/// What applying a desired configuration will do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", content = "changes", rename_all = "snake_case")]
pub enum Plan {
    Create,
    NoChange,
    Update(Vec<AttributeChange>),
    Replace(Vec<AttributeChange>),
}

impl Plan {
    pub fn is_no_change(&self) -> bool {
        matches!(self, Plan::NoChange)
    }
}

/// Compute changed attributes, skipping computed ones and honoring diff suppression
pub fn diff(
    schema: &Schema,
    prior: &Map<String, Value>,
    desired: &Map<String, Value>,
) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    for (name, field) in schema.iter() {
        if field.is_computed() {
            continue;
        }

        let before = prior.get(name).filter(|v| !v.is_null());
        let after = desired.get(name).filter(|v| !v.is_null());
        if before == after {
            continue;
        }

        if let Some(suppress) = field.diff_suppress {
            let old = before.and_then(Value::as_str).unwrap_or_default();
            let new = after.and_then(Value::as_str).unwrap_or_default();
            if suppress(old, new) {
                tracing::debug!("suppressed diff on {}", name);
                continue;
            }
        }

        changes.push(AttributeChange {
            name: name.to_string(),
            before: before.cloned(),
            after: after.cloned(),
            requires_replace: field.force_new,
        });
    }

    changes
}

/// Plan a change given optional stored attributes
pub fn plan(schema: &Schema, prior: Option<&Map<String, Value>>, desired: &Map<String, Value>) -> Plan {
    let Some(prior) = prior else {
        return Plan::Create;
    };

    let changes = diff(schema, prior, desired);
    if changes.is_empty() {
        Plan::NoChange
    } else if changes.iter().any(|c| c.requires_replace) {
        Plan::Replace(changes)
    } else {
        Plan::Update(changes)
    }
}
