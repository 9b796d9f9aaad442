//! EdgeGrid Client
//!
//! Main client for the Akamai OPEN APIs, combining request signing, the HTTP
//! transport and URL helpers. Implements every remote API trait the resource
//! handlers depend on.

use super::auth::EdgeGridCredentials;
use super::http::{decode, EdgeGridHttpClient};
use crate::api::*;
use crate::error::{ProviderError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

#[derive(Clone)]
pub struct EdgeGridClient {
    pub http: EdgeGridHttpClient,
}

impl EdgeGridClient {
    pub fn new(credentials: EdgeGridCredentials) -> Result<Self> {
        credentials.validate()?;
        Ok(Self {
            http: EdgeGridHttpClient::new(credentials)?,
        })
    }

    /// Client against an explicit base URL (local mocks, proxies)
    pub fn with_base_url(credentials: EdgeGridCredentials, base_url: Url) -> Result<Self> {
        Ok(Self {
            http: EdgeGridHttpClient::with_base_url(credentials, base_url)?,
        })
    }

    // =========================================================================
    // Application Security URL helpers
    // =========================================================================

    fn config_path(config_id: i64) -> String {
        format!("appsec/v1/configs/{}", config_id)
    }

    fn policy_path(config_id: i64, version: i64, policy_id: &str) -> String {
        format!(
            "appsec/v1/configs/{}/versions/{}/security-policies/{}",
            config_id,
            version,
            urlencoding::encode(policy_id)
        )
    }

    fn api_constraints_path(config_id: i64, version: i64, policy_id: &str, api_id: Option<i64>) -> String {
        let base = format!(
            "{}/api-request-constraints",
            Self::policy_path(config_id, version, policy_id)
        );
        match api_id {
            Some(id) => format!("{}/{}", base, id),
            None => base,
        }
    }

    async fn put_api_constraints(
        &self,
        operation: &str,
        config_id: i64,
        version: i64,
        policy_id: &str,
        api_id: Option<i64>,
        action: &str,
    ) -> Result<ApiRequestConstraintsResponse> {
        let url = self.http.url(
            &Self::api_constraints_path(config_id, version, policy_id, api_id),
            &[],
        )?;
        let response = self.http.put(operation, url, &json!({ "action": action })).await?;
        if response.is_null() {
            return Ok(ApiRequestConstraintsResponse::default());
        }
        decode(operation, response)
    }

    // =========================================================================
    // Property Manager URL helpers
    // =========================================================================

    fn cp_code_query(contract_id: &str, group_id: &str) -> [(&'static str, String); 2] {
        [
            ("contractId", contract_id.to_string()),
            ("groupId", group_id.to_string()),
        ]
    }
}

#[async_trait]
impl ConfigurationApi for EdgeGridClient {
    async fn get_configuration(&self, req: GetConfigurationRequest) -> Result<GetConfigurationResponse> {
        let url = self.http.url(&Self::config_path(req.config_id), &[])?;
        let response = self.http.get("GetConfiguration", url).await?;
        decode("GetConfiguration", response)
    }

    async fn clone_configuration_version(&self, req: CloneVersionRequest) -> Result<CloneVersionResponse> {
        tracing::info!(
            "cloning config {} version {} for {}",
            req.config_id,
            req.create_from_version,
            req.requested_by
        );
        let url = self
            .http
            .url(&format!("{}/versions", Self::config_path(req.config_id)), &[])?;
        let body = json!({
            "createFromVersion": req.create_from_version,
            "ruleUpdate": req.rule_update,
        });
        let response = self.http.post("CreateConfigurationVersionClone", url, &body).await?;
        decode("CreateConfigurationVersionClone", response)
    }
}

#[async_trait]
impl EvalRuleApi for EdgeGridClient {
    async fn get_eval_rule(&self, req: GetEvalRuleRequest) -> Result<GetEvalRuleResponse> {
        let path = format!(
            "{}/eval-rules/{}",
            Self::policy_path(req.config_id, req.version, &req.policy_id),
            req.rule_id
        );
        let url = self.http.url(&path, &[])?;
        let response = self.http.get("GetEvalRule", url).await?;
        decode("GetEvalRule", response)
    }

    async fn update_eval_rule(&self, req: UpdateEvalRuleRequest) -> Result<UpdateEvalRuleResponse> {
        let rule_path = format!(
            "{}/eval-rules/{}",
            Self::policy_path(req.config_id, req.version, &req.policy_id),
            req.rule_id
        );

        let (path, body) = match req.condition_exception {
            Some(exception) if !is_empty_json(Some(&exception)) => (
                format!("{}/action-condition-exception", rule_path),
                json!({ "action": req.action, "conditionException": exception }),
            ),
            _ => (rule_path, json!({ "action": req.action })),
        };

        let url = self.http.url(&path, &[])?;
        let response = self.http.put("UpdateEvalRule", url, &body).await?;
        if response.is_null() {
            return Ok(UpdateEvalRuleResponse {
                action: req.action,
                condition_exception: None,
            });
        }
        decode("UpdateEvalRule", response)
    }
}

#[async_trait]
impl PolicyProtectionApi for EdgeGridClient {
    async fn get_policy_protections(&self, req: GetPolicyProtectionsRequest) -> Result<PolicyProtections> {
        let path = format!(
            "{}/protections",
            Self::policy_path(req.config_id, req.version, &req.policy_id)
        );
        let url = self.http.url(&path, &[])?;
        let response = self.http.get("GetPolicyProtections", url).await?;
        decode("GetPolicyProtections", response)
    }

    async fn update_policy_protections(
        &self,
        req: UpdatePolicyProtectionsRequest,
    ) -> Result<PolicyProtections> {
        let path = format!(
            "{}/protections",
            Self::policy_path(req.config_id, req.version, &req.policy_id)
        );
        let url = self.http.url(&path, &[])?;
        let body = serde_json::to_value(req.protections).map_err(|source| ProviderError::Decode {
            operation: "UpdatePolicyProtections".to_string(),
            source,
        })?;
        let response = self.http.put("UpdatePolicyProtections", url, &body).await?;
        if response.is_null() {
            return Ok(req.protections);
        }
        decode("UpdatePolicyProtections", response)
    }
}

#[async_trait]
impl ApiRequestConstraintsApi for EdgeGridClient {
    async fn get_api_request_constraints(
        &self,
        req: GetApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        let path = format!(
            "{}/api-request-constraints",
            Self::policy_path(req.config_id, req.version, &req.policy_id)
        );
        let query: Vec<(&str, String)> = req
            .api_id
            .map(|id| vec![("apiId", id.to_string())])
            .unwrap_or_default();
        let url = self.http.url(&path, &query)?;
        let response = self.http.get("GetApiRequestConstraints", url).await?;
        decode("GetApiRequestConstraints", response)
    }

    async fn update_api_request_constraints(
        &self,
        req: UpdateApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        self.put_api_constraints(
            "UpdateApiRequestConstraints",
            req.config_id,
            req.version,
            &req.policy_id,
            req.api_id,
            &req.action,
        )
        .await
    }

    async fn remove_api_request_constraints(
        &self,
        req: RemoveApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        self.put_api_constraints(
            "RemoveApiRequestConstraints",
            req.config_id,
            req.version,
            &req.policy_id,
            req.api_id,
            &req.action,
        )
        .await
    }
}

#[async_trait]
impl CpCodeApi for EdgeGridClient {
    async fn list_cp_codes(&self, req: ListCpCodesRequest) -> Result<Vec<CpCode>> {
        let url = self.http.url(
            "papi/v1/cpcodes",
            &Self::cp_code_query(&req.contract_id, &req.group_id),
        )?;
        let response = self.http.get("GetCPCodes", url).await?;

        let items = response
            .get("cpcodes")
            .and_then(|v| v.get("items"))
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        decode("GetCPCodes", items)
    }

    async fn create_cp_code(&self, req: CreateCpCodeRequest) -> Result<CreateCpCodeResponse> {
        let url = self.http.url(
            "papi/v1/cpcodes",
            &Self::cp_code_query(&req.contract_id, &req.group_id),
        )?;
        let body = json!({
            "productId": req.product_id,
            "cpcodeName": req.cpcode_name,
        });
        let response = self.http.post("CreateCPCode", url, &body).await?;

        let cpcode_link = response
            .get("cpcodeLink")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(CreateCpCodeResponse {
            cpcode_id: cp_code_id_from_link(&cpcode_link),
            cpcode_link,
        })
    }
}

/// `/papi/v1/cpcodes/cpc_123?contractId=...` -> `cpc_123`
pub fn cp_code_id_from_link(link: &str) -> String {
    let path = link.split('?').next().unwrap_or(link);
    path.rsplit('/').next().unwrap_or(path).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp_code_id_from_link() {
        assert_eq!(
            cp_code_id_from_link("/papi/v1/cpcodes/cpc_12345?contractId=ctr_1&groupId=grp_2"),
            "cpc_12345"
        );
        assert_eq!(cp_code_id_from_link("cpc_9"), "cpc_9");
    }

    #[test]
    fn test_policy_path_encodes_policy_id() {
        assert_eq!(
            EdgeGridClient::policy_path(1, 2, "AAAA 1"),
            "appsec/v1/configs/1/versions/2/security-policies/AAAA%201"
        );
    }

    #[test]
    fn test_api_constraints_path() {
        assert_eq!(
            EdgeGridClient::api_constraints_path(43253, 7, "AAAA_81230", Some(1)),
            "appsec/v1/configs/43253/versions/7/security-policies/AAAA_81230/api-request-constraints/1"
        );
        assert!(EdgeGridClient::api_constraints_path(43253, 7, "AAAA_81230", None)
            .ends_with("/api-request-constraints"));
    }
}
