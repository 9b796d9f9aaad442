//! Configuration version resolution
//!
//! Reads target the latest version. Writes target a modifiable one: the
//! latest version when it is not active on staging or production, otherwise
//! a fresh clone of it.

use crate::api::{CloneVersionRequest, ConfigurationApi, GetConfigurationRequest};
use crate::error::{ProviderError, Result};
use std::sync::Arc;

#[derive(Clone)]
pub struct VersionResolver {
    api: Arc<dyn ConfigurationApi>,
}

impl VersionResolver {
    pub fn new(api: Arc<dyn ConfigurationApi>) -> Self {
        Self { api }
    }

    /// Latest version of a configuration, for read-only use
    pub async fn latest(&self, config_id: i64) -> Result<i64> {
        let configuration = self
            .api
            .get_configuration(GetConfigurationRequest { config_id })
            .await
            .inspect_err(|e| tracing::error!("calling GetConfiguration: {}", e))?;

        tracing::debug!(
            "config {} latest version {}",
            config_id,
            configuration.latest_version
        );
        Ok(configuration.latest_version)
    }

    /// A version that may be written to, cloning the latest if it is active
    pub async fn modifiable(&self, config_id: i64, resource_kind: &str) -> Result<i64> {
        let configuration = self
            .api
            .get_configuration(GetConfigurationRequest { config_id })
            .await
            .inspect_err(|e| tracing::error!("calling GetConfiguration: {}", e))?;

        if configuration.latest_is_editable() {
            tracing::debug!(
                "config {} version {} is editable",
                config_id,
                configuration.latest_version
            );
            return Ok(configuration.latest_version);
        }

        let cloned = self
            .api
            .clone_configuration_version(CloneVersionRequest {
                config_id,
                create_from_version: configuration.latest_version,
                rule_update: false,
                requested_by: resource_kind.to_string(),
            })
            .await
            .inspect_err(|e| tracing::error!("calling CreateConfigurationVersionClone: {}", e))?;

        if cloned.version == configuration.staging_version
            || cloned.version == configuration.production_version
        {
            return Err(ProviderError::ActiveVersion {
                config_id,
                version: cloned.version,
            });
        }

        tracing::info!(
            "config {} version {} is active; cloned to version {} for {}",
            config_id,
            configuration.latest_version,
            cloned.version,
            resource_kind
        );
        Ok(cloned.version)
    }
}
