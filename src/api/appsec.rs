//! Application Security API surface
//!
//! https://techdocs.akamai.com/application-security/reference/api

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Configurations and versions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConfigurationRequest {
    pub config_id: i64,
}

/// Configuration summary with its version pointers.
///
/// Staging and production pointers are absent until the configuration has
/// been activated on that network; they decode as 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigurationResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latest_version: i64,
    #[serde(default)]
    pub staging_version: i64,
    #[serde(default)]
    pub production_version: i64,
}

impl GetConfigurationResponse {
    /// The latest version is editable while it is active on neither network
    pub fn latest_is_editable(&self) -> bool {
        self.latest_version != self.staging_version
            && self.latest_version != self.production_version
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneVersionRequest {
    pub config_id: i64,
    pub create_from_version: i64,
    pub rule_update: bool,
    /// Resource kind that triggered the clone
    pub requested_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloneVersionResponse {
    #[serde(default)]
    pub config_id: i64,
    pub version: i64,
    #[serde(default)]
    pub based_on: Option<i64>,
}

#[async_trait]
pub trait ConfigurationApi: Send + Sync {
    async fn get_configuration(&self, req: GetConfigurationRequest) -> Result<GetConfigurationResponse>;

    async fn clone_configuration_version(&self, req: CloneVersionRequest) -> Result<CloneVersionResponse>;
}

// =============================================================================
// Evaluation rules
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetEvalRuleRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub rule_id: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEvalRuleResponse {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_exception: Option<Value>,
}

impl GetEvalRuleResponse {
    pub fn is_empty_condition_exception(&self) -> bool {
        is_empty_json(self.condition_exception.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvalRuleRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub rule_id: i64,
    pub action: String,
    /// Condition/exception payload; `None` writes the action only
    pub condition_exception: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvalRuleResponse {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_exception: Option<Value>,
}

#[async_trait]
pub trait EvalRuleApi: Send + Sync {
    async fn get_eval_rule(&self, req: GetEvalRuleRequest) -> Result<GetEvalRuleResponse>;

    async fn update_eval_rule(&self, req: UpdateEvalRuleRequest) -> Result<UpdateEvalRuleResponse>;
}

// =============================================================================
// Policy protections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPolicyProtectionsRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
}

/// Protection toggles of a security policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyProtections {
    pub apply_api_constraints: bool,
    pub apply_application_layer_controls: bool,
    pub apply_botman_controls: bool,
    pub apply_network_layer_controls: bool,
    pub apply_rate_controls: bool,
    pub apply_reputation_controls: bool,
    pub apply_slow_post_controls: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePolicyProtectionsRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub protections: PolicyProtections,
}

#[async_trait]
pub trait PolicyProtectionApi: Send + Sync {
    async fn get_policy_protections(&self, req: GetPolicyProtectionsRequest) -> Result<PolicyProtections>;

    async fn update_policy_protections(
        &self,
        req: UpdatePolicyProtectionsRequest,
    ) -> Result<PolicyProtections>;
}

// =============================================================================
// API request constraints
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetApiRequestConstraintsRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub api_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpointAction {
    pub id: i64,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestConstraintsResponse {
    #[serde(default)]
    pub api_endpoints: Vec<ApiEndpointAction>,
}

impl ApiRequestConstraintsResponse {
    pub fn action_for(&self, api_id: i64) -> Option<&str> {
        self.api_endpoints
            .iter()
            .find(|e| e.id == api_id)
            .map(|e| e.action.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateApiRequestConstraintsRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub api_id: Option<i64>,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveApiRequestConstraintsRequest {
    pub config_id: i64,
    pub version: i64,
    pub policy_id: String,
    pub api_id: Option<i64>,
    pub action: String,
}

#[async_trait]
pub trait ApiRequestConstraintsApi: Send + Sync {
    async fn get_api_request_constraints(
        &self,
        req: GetApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse>;

    async fn update_api_request_constraints(
        &self,
        req: UpdateApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse>;

    async fn remove_api_request_constraints(
        &self,
        req: RemoveApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse>;
}

/// Null, empty object and empty array all count as "no payload"
pub fn is_empty_json(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.values().all(|v| is_empty_json(Some(v))),
        Some(Value::Array(arr)) => arr.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_configuration_decodes_missing_pointers_as_zero() {
        let config: GetConfigurationResponse =
            serde_json::from_value(json!({"id": 43253, "name": "test", "latestVersion": 7}))
                .unwrap();
        assert_eq!(config.staging_version, 0);
        assert_eq!(config.production_version, 0);
        assert!(config.latest_is_editable());
    }

    #[test]
    fn test_active_latest_not_editable() {
        let config = GetConfigurationResponse {
            id: 1,
            latest_version: 7,
            staging_version: 7,
            ..Default::default()
        };
        assert!(!config.latest_is_editable());
    }

    #[test]
    fn test_protections_wire_names() {
        let p: PolicyProtections = serde_json::from_value(json!({
            "applyApiConstraints": true,
            "applyNetworkLayerControls": true,
            "applySlowPostControls": false
        }))
        .unwrap();
        assert!(p.apply_api_constraints);
        assert!(p.apply_network_layer_controls);
        assert!(!p.apply_botman_controls);
    }

    #[test]
    fn test_empty_condition_exception() {
        assert!(is_empty_json(None));
        assert!(is_empty_json(Some(&json!({}))));
        assert!(is_empty_json(Some(&json!({"conditions": [], "exception": {}}))));
        assert!(!is_empty_json(Some(&json!({"conditions": [{"type": "ipMatch"}]}))));
    }

    #[test]
    fn test_action_for_endpoint() {
        let resp = ApiRequestConstraintsResponse {
            api_endpoints: vec![
                ApiEndpointAction { id: 1, action: "alert".into() },
                ApiEndpointAction { id: 2, action: "deny".into() },
            ],
        };
        assert_eq!(resp.action_for(2), Some("deny"));
        assert_eq!(resp.action_for(3), None);
    }
}
