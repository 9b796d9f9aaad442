//! Property Manager API surface (CP codes)
//!
//! https://techdocs.akamai.com/property-mgr/reference/api

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpCode {
    pub cpcode_id: String,
    pub cpcode_name: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

impl CpCode {
    /// Match by id (with or without the `cpc_` prefix) or by name
    pub fn matches(&self, id_or_name: &str) -> bool {
        let bare = |s: &str| s.strip_prefix("cpc_").unwrap_or(s).to_string();
        self.cpcode_name == id_or_name || bare(&self.cpcode_id) == bare(id_or_name)
    }

    pub fn has_product(&self, product_id: &str) -> bool {
        self.product_ids.iter().any(|p| p == product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCpCodesRequest {
    pub contract_id: String,
    pub group_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCpCodeRequest {
    pub contract_id: String,
    pub group_id: String,
    pub product_id: String,
    pub cpcode_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateCpCodeResponse {
    pub cpcode_id: String,
    pub cpcode_link: String,
}

#[async_trait]
pub trait CpCodeApi: Send + Sync {
    async fn list_cp_codes(&self, req: ListCpCodesRequest) -> Result<Vec<CpCode>>;

    async fn create_cp_code(&self, req: CreateCpCodeRequest) -> Result<CreateCpCodeResponse>;

    /// Find a CP code in a contract/group by id or name
    async fn find_cp_code(&self, req: ListCpCodesRequest, id_or_name: &str) -> Result<Option<CpCode>> {
        let codes = self.list_cp_codes(req).await?;
        Ok(codes.into_iter().find(|c| c.matches(id_or_name)))
    }
}
