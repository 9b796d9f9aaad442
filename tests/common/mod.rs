//! Recording in-memory stand-in for the Akamai APIs
//!
//! Every call is appended to a log so tests can assert on exactly which
//! requests a lifecycle issued, and in what order. Writes update the stored
//! remote state so a following read sees them.

#![allow(dead_code)]

use akamai_provider::api::*;
use akamai_provider::error::{ProviderError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetConfiguration(i64),
    CloneVersion(CloneVersionRequest),
    GetEvalRule(GetEvalRuleRequest),
    UpdateEvalRule(UpdateEvalRuleRequest),
    GetProtections(GetPolicyProtectionsRequest),
    UpdateProtections(UpdatePolicyProtectionsRequest),
    GetConstraints(GetApiRequestConstraintsRequest),
    UpdateConstraints(UpdateApiRequestConstraintsRequest),
    RemoveConstraints(RemoveApiRequestConstraintsRequest),
    ListCpCodes(ListCpCodesRequest),
    CreateCpCode(CreateCpCodeRequest),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::CloneVersion(_)
                | Call::UpdateEvalRule(_)
                | Call::UpdateProtections(_)
                | Call::UpdateConstraints(_)
                | Call::RemoveConstraints(_)
                | Call::CreateCpCode(_)
        )
    }
}

#[derive(Default)]
pub struct MockAkamai {
    pub configuration: Mutex<GetConfigurationResponse>,
    pub eval_rule: Mutex<GetEvalRuleResponse>,
    pub protections: Mutex<PolicyProtections>,
    pub constraints: Mutex<ApiRequestConstraintsResponse>,
    pub cp_codes: Mutex<Vec<CpCode>>,
    /// When set, reads of policy-scoped entities answer 404
    pub gone: Mutex<bool>,
    /// When set, every write answers 500
    pub fail_writes: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl MockAkamai {
    /// Configuration whose latest version is `latest`, with the given active versions
    pub fn with_versions(latest: i64, staging: i64, production: i64) -> Self {
        let mock = Self::default();
        *mock.configuration.lock().unwrap() = GetConfigurationResponse {
            id: 43253,
            name: "site".into(),
            latest_version: latest,
            staging_version: staging,
            production_version: production,
        };
        mock
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_gone(&self, operation: &str) -> Result<()> {
        if *self.gone.lock().unwrap() {
            return Err(ProviderError::Api {
                operation: operation.to_string(),
                status: 404,
                detail: "Not Found".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, operation: &str) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ProviderError::Api {
                operation: operation.to_string(),
                status: 500,
                detail: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigurationApi for MockAkamai {
    async fn get_configuration(&self, req: GetConfigurationRequest) -> Result<GetConfigurationResponse> {
        self.record(Call::GetConfiguration(req.config_id));
        let mut configuration = self.configuration.lock().unwrap().clone();
        configuration.id = req.config_id;
        Ok(configuration)
    }

    async fn clone_configuration_version(&self, req: CloneVersionRequest) -> Result<CloneVersionResponse> {
        self.record(Call::CloneVersion(req.clone()));
        let mut configuration = self.configuration.lock().unwrap();
        configuration.latest_version += 1;
        Ok(CloneVersionResponse {
            config_id: req.config_id,
            version: configuration.latest_version,
            based_on: Some(req.create_from_version),
        })
    }
}

#[async_trait]
impl EvalRuleApi for MockAkamai {
    async fn get_eval_rule(&self, req: GetEvalRuleRequest) -> Result<GetEvalRuleResponse> {
        self.record(Call::GetEvalRule(req));
        self.check_gone("GetEvalRule")?;
        Ok(self.eval_rule.lock().unwrap().clone())
    }

    async fn update_eval_rule(&self, req: UpdateEvalRuleRequest) -> Result<UpdateEvalRuleResponse> {
        self.record(Call::UpdateEvalRule(req.clone()));
        self.check_write("UpdateEvalRule")?;
        let mut rule = self.eval_rule.lock().unwrap();
        rule.action = req.action.clone();
        rule.condition_exception = req.condition_exception.clone();
        Ok(UpdateEvalRuleResponse {
            action: req.action,
            condition_exception: req.condition_exception,
        })
    }
}

#[async_trait]
impl PolicyProtectionApi for MockAkamai {
    async fn get_policy_protections(&self, req: GetPolicyProtectionsRequest) -> Result<PolicyProtections> {
        self.record(Call::GetProtections(req));
        self.check_gone("GetPolicyProtections")?;
        Ok(*self.protections.lock().unwrap())
    }

    async fn update_policy_protections(
        &self,
        req: UpdatePolicyProtectionsRequest,
    ) -> Result<PolicyProtections> {
        self.record(Call::UpdateProtections(req.clone()));
        self.check_write("UpdatePolicyProtections")?;
        *self.protections.lock().unwrap() = req.protections;
        Ok(req.protections)
    }
}

#[async_trait]
impl ApiRequestConstraintsApi for MockAkamai {
    async fn get_api_request_constraints(
        &self,
        req: GetApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        self.record(Call::GetConstraints(req));
        self.check_gone("GetApiRequestConstraints")?;
        Ok(self.constraints.lock().unwrap().clone())
    }

    async fn update_api_request_constraints(
        &self,
        req: UpdateApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        self.record(Call::UpdateConstraints(req.clone()));
        self.check_write("UpdateApiRequestConstraints")?;
        let mut constraints = self.constraints.lock().unwrap();
        if let Some(api_id) = req.api_id {
            constraints.api_endpoints.retain(|e| e.id != api_id);
            constraints.api_endpoints.push(ApiEndpointAction {
                id: api_id,
                action: req.action,
            });
        } else {
            for endpoint in constraints.api_endpoints.iter_mut() {
                endpoint.action = req.action.clone();
            }
        }
        Ok(constraints.clone())
    }

    async fn remove_api_request_constraints(
        &self,
        req: RemoveApiRequestConstraintsRequest,
    ) -> Result<ApiRequestConstraintsResponse> {
        self.record(Call::RemoveConstraints(req.clone()));
        self.check_write("RemoveApiRequestConstraints")?;
        let mut constraints = self.constraints.lock().unwrap();
        match req.api_id {
            Some(api_id) => constraints.api_endpoints.retain(|e| e.id != api_id),
            None => constraints.api_endpoints.clear(),
        }
        Ok(constraints.clone())
    }
}

#[async_trait]
impl CpCodeApi for MockAkamai {
    async fn list_cp_codes(&self, req: ListCpCodesRequest) -> Result<Vec<CpCode>> {
        self.record(Call::ListCpCodes(req));
        Ok(self.cp_codes.lock().unwrap().clone())
    }

    async fn create_cp_code(&self, req: CreateCpCodeRequest) -> Result<CreateCpCodeResponse> {
        self.record(Call::CreateCpCode(req.clone()));
        self.check_write("CreateCpCode")?;
        let mut codes = self.cp_codes.lock().unwrap();
        let cpcode_id = format!("cpc_{}", 1000 + codes.len());
        codes.push(CpCode {
            cpcode_id: cpcode_id.clone(),
            cpcode_name: req.cpcode_name,
            product_ids: vec![req.product_id],
            created_date: None,
        });
        Ok(CreateCpCodeResponse {
            cpcode_link: format!(
                "/papi/v1/cpcodes/{}?contractId={}&groupId={}",
                cpcode_id, req.contract_id, req.group_id
            ),
            cpcode_id,
        })
    }
}
