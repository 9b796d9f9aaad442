//! `akamai_appsec_eval_rule` - action and condition exception of an
//! evaluation-mode rule in a security policy.
//!
//! Deleting the resource sets the rule action to `none`.

use super::handler::{resolved, ResourceKind};
use super::identity::{encode, Identity};
use super::validate::{
    suppress_equivalent_json, validate_action, validate_action_and_condition_exception,
    validate_json_string, verify_id_unchanged,
};
use crate::api::{EvalRuleApi, GetEvalRuleRequest, UpdateEvalRuleRequest};
use crate::error::{ProviderError, Result};
use crate::framework::{Field, FieldType, ResourceData, Schema};
use async_trait::async_trait;
use serde_json::Value;

const ID_FORMAT: &str = "configID:securityPolicyID:ruleID";

/// Attributes the identity is built from
const ID_FIELDS: &[&str] = &["config_id", "security_policy_id", "rule_id"];

pub struct EvalRule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalRuleKey {
    pub config_id: i64,
    pub policy_id: String,
    pub rule_id: i64,
}

/// Configured condition exception as JSON, `None` when empty
fn condition_exception(d: &ResourceData) -> Result<Option<Value>> {
    let Some(text) = d.get_opt_string("condition_exception")? else {
        return Ok(None);
    };
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ProviderError::validation("condition_exception", e.to_string()))
}

#[async_trait]
impl ResourceKind for EvalRule {
    type Api = dyn EvalRuleApi;
    type Key = EvalRuleKey;

    fn type_name(&self) -> &'static str {
        "akamai_appsec_eval_rule"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("config_id", Field::required(FieldType::Int))
            .field("security_policy_id", Field::required(FieldType::String))
            .field("rule_id", Field::required(FieldType::Int))
            .field(
                "rule_action",
                Field::required(FieldType::String).validate_with(validate_action),
            )
            .field(
                "condition_exception",
                Field::optional(FieldType::String)
                    .default_value("")
                    .validate_with(validate_json_string)
                    .suppress_diff_with(suppress_equivalent_json),
            )
    }

    fn version_tag(&self) -> Option<&'static str> {
        Some("evalRule")
    }

    fn key_from_record(&self, d: &ResourceData) -> Result<EvalRuleKey> {
        Ok(EvalRuleKey {
            config_id: d.get_int("config_id")?,
            policy_id: d.get_string("security_policy_id")?,
            rule_id: d.get_int("rule_id")?,
        })
    }

    fn key_from_id(&self, id: &str, _d: &ResourceData) -> Result<EvalRuleKey> {
        let id = Identity::decode(id, 3, ID_FORMAT)?;
        Ok(EvalRuleKey {
            config_id: id.int(0)?,
            policy_id: id.str(1).to_string(),
            rule_id: id.int(2)?,
        })
    }

    fn encode_key(&self, key: &EvalRuleKey) -> String {
        encode(&[&key.config_id, &key.policy_id, &key.rule_id])
    }

    fn config_id(&self, key: &EvalRuleKey) -> Option<i64> {
        Some(key.config_id)
    }

    fn validate(&self, d: &ResourceData) -> Result<()> {
        let action = d.get_string("rule_action")?;
        let exception = d.get_opt_string("condition_exception")?.unwrap_or_default();
        validate_action_and_condition_exception(&action, &exception)
    }

    fn customize_diff(&self, d: &ResourceData) -> Result<()> {
        verify_id_unchanged(d, ID_FIELDS)
    }

    async fn write(
        &self,
        api: &Self::Api,
        key: &EvalRuleKey,
        version: Option<i64>,
        d: &ResourceData,
    ) -> Result<EvalRuleKey> {
        api.update_eval_rule(UpdateEvalRuleRequest {
            config_id: key.config_id,
            version: resolved(version)?,
            policy_id: key.policy_id.clone(),
            rule_id: key.rule_id,
            action: d.get_string("rule_action")?,
            condition_exception: condition_exception(d)?,
        })
        .await?;
        Ok(key.clone())
    }

    async fn fetch(
        &self,
        api: &Self::Api,
        key: &EvalRuleKey,
        version: Option<i64>,
        d: &mut ResourceData,
    ) -> Result<Option<EvalRuleKey>> {
        let rule = api
            .get_eval_rule(GetEvalRuleRequest {
                config_id: key.config_id,
                version: resolved(version)?,
                policy_id: key.policy_id.clone(),
                rule_id: key.rule_id,
            })
            .await?;

        d.set("config_id", key.config_id)?;
        d.set("security_policy_id", key.policy_id.as_str())?;
        d.set("rule_id", key.rule_id)?;
        d.set("rule_action", rule.action.as_str())?;

        if !rule.is_empty_condition_exception() {
            let json = serde_json::to_string(&rule.condition_exception).map_err(|source| {
                ProviderError::Decode {
                    operation: "GetEvalRule".to_string(),
                    source,
                }
            })?;
            d.set("condition_exception", json)?;
        }

        Ok(Some(key.clone()))
    }

    async fn reset(&self, api: &Self::Api, key: &EvalRuleKey, version: Option<i64>) -> Result<()> {
        api.update_eval_rule(UpdateEvalRuleRequest {
            config_id: key.config_id,
            version: resolved(version)?,
            policy_id: key.policy_id.clone(),
            rule_id: key.rule_id,
            action: "none".to_string(),
            condition_exception: None,
        })
        .await?;
        Ok(())
    }
}
