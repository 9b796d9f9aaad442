//! `akamai_appsec_api_request_constraints` - the action taken on requests
//! violating API constraints, for one API endpoint or for the whole policy.

use super::handler::{resolved, ResourceKind};
use super::identity::{encode, Identity, DELIMITER};
use super::render::{render, OutputTemplates};
use super::validate::{validate_action, verify_id_unchanged};
use crate::api::{
    ApiRequestConstraintsApi, ApiRequestConstraintsResponse, GetApiRequestConstraintsRequest,
    RemoveApiRequestConstraintsRequest, UpdateApiRequestConstraintsRequest,
};
use crate::error::Result;
use crate::framework::{Field, FieldType, ResourceData, Schema};
use async_trait::async_trait;

const ID_FORMAT: &str = "configID:securityPolicyID:apiID";
const POLICY_ID_FORMAT: &str = "configID:securityPolicyID";

/// Attributes the identity is built from
const ID_FIELDS: &[&str] = &["config_id", "security_policy_id", "api_endpoint_id"];

pub struct ApiRequestConstraints;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintKey {
    pub config_id: i64,
    pub policy_id: String,
    pub api_id: Option<i64>,
}

fn output_text(resp: &ApiRequestConstraintsResponse) -> Option<String> {
    render(OutputTemplates::builtin(), "apiRequestConstraintsDS", resp)
        .inspect_err(|e| tracing::debug!("rendering apiRequestConstraintsDS: {}", e))
        .ok()
}

#[async_trait]
impl ResourceKind for ApiRequestConstraints {
    type Api = dyn ApiRequestConstraintsApi;
    type Key = ConstraintKey;

    fn type_name(&self) -> &'static str {
        "akamai_appsec_api_request_constraints"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("config_id", Field::required(FieldType::Int))
            .field("security_policy_id", Field::required(FieldType::String))
            .field(
                "api_endpoint_id",
                Field::optional(FieldType::Int)
                    .describe("API endpoint the action applies to; all endpoints when unset"),
            )
            .field(
                "action",
                Field::required(FieldType::String).validate_with(validate_action),
            )
            .field("output_text", Field::computed(FieldType::String))
    }

    fn version_tag(&self) -> Option<&'static str> {
        Some("apirequestconstraints")
    }

    fn key_from_record(&self, d: &ResourceData) -> Result<ConstraintKey> {
        Ok(ConstraintKey {
            config_id: d.get_int("config_id")?,
            policy_id: d.get_string("security_policy_id")?,
            api_id: d.get_opt_int("api_endpoint_id")?,
        })
    }

    fn key_from_id(&self, id: &str, _d: &ResourceData) -> Result<ConstraintKey> {
        if id.split(DELIMITER).count() == 2 {
            let id = Identity::decode(id, 2, POLICY_ID_FORMAT)?;
            return Ok(ConstraintKey {
                config_id: id.int(0)?,
                policy_id: id.str(1).to_string(),
                api_id: None,
            });
        }

        let id = Identity::decode(id, 3, ID_FORMAT)?;
        Ok(ConstraintKey {
            config_id: id.int(0)?,
            policy_id: id.str(1).to_string(),
            api_id: Some(id.int(2)?),
        })
    }

    fn encode_key(&self, key: &ConstraintKey) -> String {
        match key.api_id {
            Some(api_id) => encode(&[&key.config_id, &key.policy_id, &api_id]),
            None => encode(&[&key.config_id, &key.policy_id]),
        }
    }

    fn config_id(&self, key: &ConstraintKey) -> Option<i64> {
        Some(key.config_id)
    }

    fn customize_diff(&self, d: &ResourceData) -> Result<()> {
        verify_id_unchanged(d, ID_FIELDS)
    }

    async fn write(
        &self,
        api: &Self::Api,
        key: &ConstraintKey,
        version: Option<i64>,
        d: &ResourceData,
    ) -> Result<ConstraintKey> {
        api.update_api_request_constraints(UpdateApiRequestConstraintsRequest {
            config_id: key.config_id,
            version: resolved(version)?,
            policy_id: key.policy_id.clone(),
            api_id: key.api_id,
            action: d.get_string("action")?,
        })
        .await?;
        Ok(key.clone())
    }

    async fn fetch(
        &self,
        api: &Self::Api,
        key: &ConstraintKey,
        version: Option<i64>,
        d: &mut ResourceData,
    ) -> Result<Option<ConstraintKey>> {
        let resp = api
            .get_api_request_constraints(GetApiRequestConstraintsRequest {
                config_id: key.config_id,
                version: resolved(version)?,
                policy_id: key.policy_id.clone(),
                api_id: key.api_id,
            })
            .await?;

        d.set("config_id", key.config_id)?;
        d.set("security_policy_id", key.policy_id.as_str())?;
        if let Some(api_id) = key.api_id {
            d.set("api_endpoint_id", api_id)?;
            if let Some(action) = resp.action_for(api_id) {
                d.set("action", action)?;
            }
        }
        if let Some(text) = output_text(&resp) {
            d.set("output_text", text)?;
        }

        Ok(Some(key.clone()))
    }

    async fn reset(
        &self,
        api: &Self::Api,
        key: &ConstraintKey,
        version: Option<i64>,
    ) -> Result<()> {
        api.remove_api_request_constraints(RemoveApiRequestConstraintsRequest {
            config_id: key.config_id,
            version: resolved(version)?,
            policy_id: key.policy_id.clone(),
            api_id: key.api_id,
            action: "none".to_string(),
        })
        .await?;
        Ok(())
    }
}
