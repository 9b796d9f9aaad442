//! Resource Registry - the resource types this provider serves
//!
//! Every type is registered once against a client implementing the remote
//! API traits and looked up by its type name afterwards.

use super::api_request_constraints::ApiRequestConstraints;
use super::cp_code::CpCodeResource;
use super::eval_rule::EvalRule;
use super::handler::{Handler, Lifecycle, ResourceKind};
use super::ip_geo_protection::IpGeoProtection;
use super::version::VersionResolver;
use crate::api::{
    ApiRequestConstraintsApi, ConfigurationApi, CpCodeApi, EvalRuleApi, PolicyProtectionApi,
};
use crate::error::{ProviderError, Result};
use crate::framework::Schema;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Schemas of every resource type, without binding a client
pub fn builtin_schemas() -> BTreeMap<&'static str, Schema> {
    BTreeMap::from([
        (EvalRule.type_name(), EvalRule.schema()),
        (IpGeoProtection.type_name(), IpGeoProtection.schema()),
        (ApiRequestConstraints.type_name(), ApiRequestConstraints.schema()),
        (CpCodeResource.type_name(), CpCodeResource.schema()),
    ])
}

pub struct Provider {
    resources: BTreeMap<&'static str, Box<dyn Lifecycle>>,
}

impl Provider {
    /// Provider with every resource type bound to `client`
    pub fn new<C>(client: Arc<C>) -> Self
    where
        C: ConfigurationApi
            + EvalRuleApi
            + PolicyProtectionApi
            + ApiRequestConstraintsApi
            + CpCodeApi
            + 'static,
    {
        let versions = VersionResolver::new(client.clone());
        let eval_rules: Arc<dyn EvalRuleApi> = client.clone();
        let protections: Arc<dyn PolicyProtectionApi> = client.clone();
        let constraints: Arc<dyn ApiRequestConstraintsApi> = client.clone();
        let cp_codes: Arc<dyn CpCodeApi> = client;

        let mut provider = Self::empty();
        provider.register(Handler::new(EvalRule, eval_rules, versions.clone()));
        provider.register(Handler::new(IpGeoProtection, protections, versions.clone()));
        provider.register(Handler::new(ApiRequestConstraints, constraints, versions.clone()));
        provider.register(Handler::new(CpCodeResource, cp_codes, versions));
        provider
    }

    pub fn empty() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, lifecycle: impl Lifecycle + 'static) {
        tracing::debug!("registering resource type {}", lifecycle.type_name());
        self.resources
            .insert(lifecycle.type_name(), Box::new(lifecycle));
    }

    /// Look up a resource type by name
    pub fn resource(&self, type_name: &str) -> Result<&dyn Lifecycle> {
        self.resources
            .get(type_name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn schemas(&self) -> BTreeMap<&'static str, Arc<Schema>> {
        self.resources
            .iter()
            .map(|(name, r)| (*name, r.schema()))
            .collect()
    }
}
