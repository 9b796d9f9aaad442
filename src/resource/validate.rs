//! Field and cross-field validators shared by the appsec resources

use crate::api::is_empty_json;
use crate::error::{ProviderError, Result};
use crate::framework::ResourceData;
use serde_json::Value;

/// Actions a rule or endpoint may take; `deny_custom_{id}` is also accepted
const ACTIONS: &[&str] = &["alert", "deny", "none"];

fn is_valid_action(action: &str) -> bool {
    if ACTIONS.contains(&action) {
        return true;
    }
    match action.strip_prefix("deny_custom_") {
        Some(id) => !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Schema validator for action attributes
pub fn validate_action(value: &Value, name: &str) -> Result<()> {
    let Some(action) = value.as_str() else {
        return Err(ProviderError::invalid_type(name, "string"));
    };
    if is_valid_action(action) {
        Ok(())
    } else {
        Err(ProviderError::validation(
            name,
            format!(
                "{:?} may only contain alert, deny, none, deny_custom_{{custom_deny_id}}",
                action
            ),
        ))
    }
}

/// Schema validator for attributes holding JSON text; empty is allowed
pub fn validate_json_string(value: &Value, name: &str) -> Result<()> {
    let Some(text) = value.as_str() else {
        return Err(ProviderError::invalid_type(name, "string"));
    };
    if text.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<Value>(text)
        .map(|_| ())
        .map_err(|e| ProviderError::validation(name, format!("contains an invalid JSON: {}", e)))
}

fn parse_payload(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return Some(Value::Null);
    }
    serde_json::from_str(text).ok()
}

/// An action of `none` cannot carry a condition exception
pub fn validate_action_and_condition_exception(action: &str, condition_exception: &str) -> Result<()> {
    let payload = parse_payload(condition_exception).ok_or_else(|| {
        ProviderError::validation("condition_exception", "contains an invalid JSON")
    })?;

    if action == "none" && !is_empty_json(Some(&payload)) {
        return Err(ProviderError::validation(
            "condition_exception",
            "condition_exception cannot be set when rule_action is \"none\"",
        ));
    }
    Ok(())
}

/// Diff suppression for JSON text: equal documents, ignoring formatting,
/// key order and empty payloads, are not a change
pub fn suppress_equivalent_json(old: &str, new: &str) -> bool {
    if old == new {
        return true;
    }
    match (parse_payload(old), parse_payload(new)) {
        (Some(a), Some(b)) => a == b || (is_empty_json(Some(&a)) && is_empty_json(Some(&b))),
        _ => false,
    }
}

/// Plan-time check that the attributes encoded in the identity were not edited
pub fn verify_id_unchanged(d: &ResourceData, id_fields: &[&str]) -> Result<()> {
    if d.id().is_empty() {
        return Ok(());
    }

    for field in id_fields {
        let (old, new) = d.get_change(field);
        if (old.is_some() || new.is_some()) && old != new {
            let show = |v: Option<&Value>| v.map_or_else(|| "unset".to_string(), Value::to_string);
            return Err(ProviderError::validation(
                *field,
                format!(
                    "{} value {} specified in configuration differs from resource ID's value {}",
                    field,
                    show(new),
                    show(old)
                ),
            ));
        }
    }
    Ok(())
}
