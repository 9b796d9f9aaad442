//! `akamai_appsec_ip_geo_protection` - the network layer controls toggle of
//! a security policy.

use super::handler::{resolved, ResourceKind};
use super::identity::{encode, Identity};
use super::render::{render, OutputTemplates};
use super::validate::verify_id_unchanged;
use crate::api::{
    GetPolicyProtectionsRequest, PolicyProtectionApi, PolicyProtections,
    UpdatePolicyProtectionsRequest,
};
use crate::error::Result;
use crate::framework::{Field, FieldType, ResourceData, Schema};
use async_trait::async_trait;

const ID_FORMAT: &str = "configID:securityPolicyID";

/// Attributes the identity is built from
const ID_FIELDS: &[&str] = &["config_id", "security_policy_id"];

pub struct IpGeoProtection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyKey {
    pub config_id: i64,
    pub policy_id: String,
}

impl PolicyKey {
    fn get_request(&self, version: i64) -> GetPolicyProtectionsRequest {
        GetPolicyProtectionsRequest {
            config_id: self.config_id,
            version,
            policy_id: self.policy_id.clone(),
        }
    }
}

/// Flip network layer controls, keeping every other protection as it is
async fn set_network_layer_controls(
    api: &dyn PolicyProtectionApi,
    key: &PolicyKey,
    version: i64,
    enabled: bool,
) -> Result<()> {
    let mut protections = api.get_policy_protections(key.get_request(version)).await?;
    protections.apply_network_layer_controls = enabled;

    api.update_policy_protections(UpdatePolicyProtectionsRequest {
        config_id: key.config_id,
        version,
        policy_id: key.policy_id.clone(),
        protections,
    })
    .await?;
    Ok(())
}

fn output_text(protections: &PolicyProtections) -> Option<String> {
    render(OutputTemplates::builtin(), "networkProtectionDS", protections)
        .inspect_err(|e| tracing::debug!("rendering networkProtectionDS: {}", e))
        .ok()
}

#[async_trait]
impl ResourceKind for IpGeoProtection {
    type Api = dyn PolicyProtectionApi;
    type Key = PolicyKey;

    fn type_name(&self) -> &'static str {
        "akamai_appsec_ip_geo_protection"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("config_id", Field::required(FieldType::Int))
            .field("security_policy_id", Field::required(FieldType::String))
            .field(
                "enabled",
                Field::required(FieldType::Bool)
                    .describe("Whether to enable IP/Geo protection"),
            )
            .field(
                "output_text",
                Field::computed(FieldType::String)
                    .describe("Text representation of the policy protections"),
            )
    }

    fn version_tag(&self) -> Option<&'static str> {
        Some("ipgeoProtection")
    }

    fn key_from_record(&self, d: &ResourceData) -> Result<PolicyKey> {
        Ok(PolicyKey {
            config_id: d.get_int("config_id")?,
            policy_id: d.get_string("security_policy_id")?,
        })
    }

    fn key_from_id(&self, id: &str, _d: &ResourceData) -> Result<PolicyKey> {
        let id = Identity::decode(id, 2, ID_FORMAT)?;
        Ok(PolicyKey {
            config_id: id.int(0)?,
            policy_id: id.str(1).to_string(),
        })
    }

    fn encode_key(&self, key: &PolicyKey) -> String {
        encode(&[&key.config_id, &key.policy_id])
    }

    fn config_id(&self, key: &PolicyKey) -> Option<i64> {
        Some(key.config_id)
    }

    fn customize_diff(&self, d: &ResourceData) -> Result<()> {
        verify_id_unchanged(d, ID_FIELDS)
    }

    async fn write(
        &self,
        api: &Self::Api,
        key: &PolicyKey,
        version: Option<i64>,
        d: &ResourceData,
    ) -> Result<PolicyKey> {
        set_network_layer_controls(api, key, resolved(version)?, d.get_bool("enabled")?).await?;
        Ok(key.clone())
    }

    async fn fetch(
        &self,
        api: &Self::Api,
        key: &PolicyKey,
        version: Option<i64>,
        d: &mut ResourceData,
    ) -> Result<Option<PolicyKey>> {
        let protections = api
            .get_policy_protections(key.get_request(resolved(version)?))
            .await?;

        d.set("config_id", key.config_id)?;
        d.set("security_policy_id", key.policy_id.as_str())?;
        d.set("enabled", protections.apply_network_layer_controls)?;
        if let Some(text) = output_text(&protections) {
            d.set("output_text", text)?;
        }

        Ok(Some(key.clone()))
    }

    async fn reset(
        &self,
        api: &Self::Api,
        key: &PolicyKey,
        version: Option<i64>,
    ) -> Result<()> {
        set_network_layer_controls(api, key, resolved(version)?, false).await
    }
}
