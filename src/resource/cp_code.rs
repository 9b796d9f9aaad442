//! `akamai_cp_code` - a CP code in a contract and group.
//!
//! CP codes cannot be deleted through the Property Manager API, so creating
//! one with the name of an existing code adopts that code, and deleting the
//! resource only forgets it.

use super::handler::ResourceKind;
use crate::api::{CpCode, CpCodeApi, CreateCpCodeRequest, ListCpCodesRequest};
use crate::error::{ProviderError, Result};
use crate::framework::{Field, FieldType, ResourceData, Schema};
use async_trait::async_trait;

/// Import identities carry the contract and group the code lives in
const IMPORT_FORMAT: &str = "cpcodeID,contractID,groupID";

pub struct CpCodeResource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpCodeKey {
    /// Empty until the code has been created or found
    pub cpcode_id: String,
    pub contract_id: String,
    pub group_id: String,
}

impl CpCodeKey {
    fn list_request(&self) -> ListCpCodesRequest {
        ListCpCodesRequest {
            contract_id: self.contract_id.clone(),
            group_id: self.group_id.clone(),
        }
    }
}

fn product_mismatch(code: &CpCode, product: &str) -> ProviderError {
    ProviderError::ImmutableField {
        field: "product".to_string(),
        message: format!(
            "CP code {} exists without product {} (has: {})",
            code.cpcode_id,
            product,
            code.product_ids.join(", ")
        ),
    }
}

#[async_trait]
impl ResourceKind for CpCodeResource {
    type Api = dyn CpCodeApi;
    type Key = CpCodeKey;

    fn type_name(&self) -> &'static str {
        "akamai_cp_code"
    }

    fn schema(&self) -> Schema {
        Schema::new()
            .field("name", Field::required(FieldType::String).force_new())
            .field("contract", Field::required(FieldType::String))
            .field("group", Field::required(FieldType::String))
            .field("product", Field::required(FieldType::String))
    }

    fn version_tag(&self) -> Option<&'static str> {
        None
    }

    fn key_from_record(&self, d: &ResourceData) -> Result<CpCodeKey> {
        Ok(CpCodeKey {
            cpcode_id: String::new(),
            contract_id: d.get_string("contract")?,
            group_id: d.get_string("group")?,
        })
    }

    fn key_from_id(&self, id: &str, d: &ResourceData) -> Result<CpCodeKey> {
        if id.contains(',') {
            let parts: Vec<&str> = id.split(',').map(str::trim).collect();
            return match parts.as_slice() {
                [cpcode, contract, group]
                    if !cpcode.is_empty() && !contract.is_empty() && !group.is_empty() =>
                {
                    Ok(CpCodeKey {
                        cpcode_id: cpcode.to_string(),
                        contract_id: contract.to_string(),
                        group_id: group.to_string(),
                    })
                }
                _ => Err(ProviderError::InvalidId {
                    id: id.to_string(),
                    format: IMPORT_FORMAT.to_string(),
                }),
            };
        }

        Ok(CpCodeKey {
            cpcode_id: id.to_string(),
            contract_id: d.get_string("contract")?,
            group_id: d.get_string("group")?,
        })
    }

    fn encode_key(&self, key: &CpCodeKey) -> String {
        key.cpcode_id.clone()
    }

    fn config_id(&self, _key: &CpCodeKey) -> Option<i64> {
        None
    }

    fn immutable_fields(&self) -> &'static [&'static str] {
        &["contract", "group", "product"]
    }

    fn update_writes(&self) -> bool {
        false
    }

    async fn write(
        &self,
        api: &Self::Api,
        key: &CpCodeKey,
        _version: Option<i64>,
        d: &ResourceData,
    ) -> Result<CpCodeKey> {
        let name = d.get_string("name")?;
        let product = d.get_string("product")?;

        let cpcode_id = match api.find_cp_code(key.list_request(), &name).await? {
            Some(existing) => {
                tracing::debug!("reusing CP code {} for name {}", existing.cpcode_id, name);
                if !existing.has_product(&product) {
                    return Err(product_mismatch(&existing, &product));
                }
                existing.cpcode_id
            }
            None => {
                let created = api
                    .create_cp_code(CreateCpCodeRequest {
                        contract_id: key.contract_id.clone(),
                        group_id: key.group_id.clone(),
                        product_id: product,
                        cpcode_name: name,
                    })
                    .await?;
                tracing::debug!("created CP code {}", created.cpcode_id);
                created.cpcode_id
            }
        };

        Ok(CpCodeKey {
            cpcode_id,
            ..key.clone()
        })
    }

    async fn fetch(
        &self,
        api: &Self::Api,
        key: &CpCodeKey,
        _version: Option<i64>,
        d: &mut ResourceData,
    ) -> Result<Option<CpCodeKey>> {
        let mut found = api.find_cp_code(key.list_request(), &key.cpcode_id).await?;
        if found.is_none() {
            if let Some(name) = d.get_opt_string("name")? {
                found = api.find_cp_code(key.list_request(), &name).await?;
            }
        }
        let Some(code) = found else {
            return Ok(None);
        };
        tracing::debug!("read CP code {:?}", code);

        d.set("name", code.cpcode_name.as_str())?;
        d.set("contract", key.contract_id.as_str())?;
        d.set("group", key.group_id.as_str())?;
        let product = d.get_opt_string("product")?;
        if product.is_none() {
            if let Some(first) = code.product_ids.first() {
                d.set("product", first.as_str())?;
            }
        }

        Ok(Some(CpCodeKey {
            cpcode_id: code.cpcode_id,
            ..key.clone()
        }))
    }

    async fn reset(&self, _api: &Self::Api, key: &CpCodeKey, _version: Option<i64>) -> Result<()> {
        tracing::debug!("CP code {} has no delete operation; forgetting it", key.cpcode_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn record() -> ResourceData {
        let config = json!({
            "name": "my-site",
            "contract": "ctr_1",
            "group": "grp_2",
            "product": "prd_Web_App_Accel"
        });
        ResourceData::from_config(Arc::new(CpCodeResource.schema()), config.as_object().unwrap())
            .unwrap()
    }

    #[test]
    fn test_key_from_plain_id_uses_record() {
        let key = CpCodeResource.key_from_id("cpc_123", &record()).unwrap();
        assert_eq!(key.cpcode_id, "cpc_123");
        assert_eq!(key.contract_id, "ctr_1");
        assert_eq!(key.group_id, "grp_2");
    }

    #[test]
    fn test_key_from_import_id() {
        let empty = ResourceData::from_state(Arc::new(CpCodeResource.schema()), "", Default::default());
        let key = CpCodeResource.key_from_id("cpc_123,ctr_9,grp_8", &empty).unwrap();
        assert_eq!(key.contract_id, "ctr_9");
        assert_eq!(key.group_id, "grp_8");
        assert_eq!(CpCodeResource.encode_key(&key), "cpc_123");

        let err = CpCodeResource.key_from_id("cpc_123,ctr_9", &empty).unwrap_err();
        assert!(err.to_string().contains(IMPORT_FORMAT));
    }

    #[test]
    fn test_plain_id_without_contract_fails() {
        let empty = ResourceData::from_state(Arc::new(CpCodeResource.schema()), "", Default::default());
        assert!(CpCodeResource.key_from_id("cpc_123", &empty).is_err());
    }
}
