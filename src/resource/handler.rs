//! Generic resource lifecycle
//!
//! Every resource type follows the same create/read/update/delete shape.
//! [`Handler`] implements that shape once; a [`ResourceKind`] descriptor
//! supplies what differs per type: schema, identity layout, and the request
//! translation for writes, reads and resets.

use super::version::VersionResolver;
use crate::error::{ProviderError, Result};
use crate::framework::{plan, Plan, ResourceData, Schema};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Per-resource-type descriptor driven by [`Handler`]
#[async_trait]
pub trait ResourceKind: Send + Sync + 'static {
    /// Remote operations this resource calls
    type Api: ?Sized + Send + Sync;
    /// Decoded identity
    type Key: Clone + fmt::Debug + Send + Sync;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    /// Tag recorded when a write needs a cloned configuration version.
    /// `None` for resources that do not live in a versioned configuration.
    fn version_tag(&self) -> Option<&'static str>;

    /// Key for a resource about to be created
    fn key_from_record(&self, d: &ResourceData) -> Result<Self::Key>;

    /// Key for an existing resource
    fn key_from_id(&self, id: &str, d: &ResourceData) -> Result<Self::Key>;

    fn encode_key(&self, key: &Self::Key) -> String;

    fn config_id(&self, key: &Self::Key) -> Option<i64>;

    /// Attributes that cannot change once created
    fn immutable_fields(&self) -> &'static [&'static str] {
        &[]
    }

    /// Whether update pushes attributes. Kinds whose mutable attributes live
    /// only in the record return `false`; update then only re-reads.
    fn update_writes(&self) -> bool {
        true
    }

    /// Cross-field validation, run before any remote call on create and update
    fn validate(&self, _d: &ResourceData) -> Result<()> {
        Ok(())
    }

    /// Plan-time checks on an existing resource
    fn customize_diff(&self, _d: &ResourceData) -> Result<()> {
        Ok(())
    }

    /// Push desired attributes; returns the key the resource is known by afterwards
    async fn write(
        &self,
        api: &Self::Api,
        key: &Self::Key,
        version: Option<i64>,
        d: &ResourceData,
    ) -> Result<Self::Key>;

    /// Load remote state into the record; `None` when the entity is gone
    async fn fetch(
        &self,
        api: &Self::Api,
        key: &Self::Key,
        version: Option<i64>,
        d: &mut ResourceData,
    ) -> Result<Option<Self::Key>>;

    /// Return the managed attributes to their neutral value
    async fn reset(&self, api: &Self::Api, key: &Self::Key, version: Option<i64>) -> Result<()>;
}

/// The version a versioned resource was resolved against
pub fn resolved(version: Option<i64>) -> Result<i64> {
    version.ok_or_else(|| ProviderError::Config("configuration version was not resolved".into()))
}

/// Object-safe lifecycle entry points, one per registered resource type
#[async_trait]
pub trait Lifecycle: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Arc<Schema>;

    async fn create(&self, d: &mut ResourceData) -> Result<()>;

    async fn read(&self, d: &mut ResourceData) -> Result<()>;

    async fn update(&self, d: &mut ResourceData) -> Result<()>;

    async fn delete(&self, d: &mut ResourceData) -> Result<()>;

    /// Adopt an existing remote entity by identity
    async fn import(&self, id: &str) -> Result<ResourceData>;

    /// Plan the change from `d`'s prior attributes to its desired ones
    fn plan(&self, d: &ResourceData) -> Result<Plan>;
}

pub struct Handler<R: ResourceKind> {
    kind: R,
    api: Arc<R::Api>,
    versions: VersionResolver,
    schema: Arc<Schema>,
}

impl<R: ResourceKind> Handler<R> {
    pub fn new(kind: R, api: Arc<R::Api>, versions: VersionResolver) -> Self {
        let schema = Arc::new(kind.schema());
        Self {
            kind,
            api,
            versions,
            schema,
        }
    }

    fn span(&self, op: &'static str) -> tracing::Span {
        tracing::debug_span!(
            "resource",
            kind = self.kind.type_name(),
            op,
            operation_id = %uuid::Uuid::new_v4()
        )
    }

    async fn resolve_version(&self, key: &R::Key, modifiable: bool) -> Result<Option<i64>> {
        let (Some(tag), Some(config_id)) = (self.kind.version_tag(), self.kind.config_id(key)) else {
            return Ok(None);
        };
        let version = if modifiable {
            self.versions.modifiable(config_id, tag).await?
        } else {
            self.versions.latest(config_id).await?
        };
        Ok(Some(version))
    }

    async fn do_create(&self, d: &mut ResourceData) -> Result<()> {
        tracing::debug!("in create");

        self.kind.validate(d)?;
        let key = self.kind.key_from_record(d)?;
        let version = self.resolve_version(&key, true).await?;

        let key = self
            .kind
            .write(self.api.as_ref(), &key, version, d)
            .await
            .inspect_err(|e| tracing::error!("create {}: {}", self.kind.type_name(), e))?;

        d.set_id(self.kind.encode_key(&key));
        self.do_read(d).await
    }

    async fn do_read(&self, d: &mut ResourceData) -> Result<()> {
        tracing::debug!("in read");

        let key = self.kind.key_from_id(d.id(), d)?;
        let version = self.resolve_version(&key, false).await?;

        match self.kind.fetch(self.api.as_ref(), &key, version, d).await {
            Ok(Some(key)) => {
                d.set_id(self.kind.encode_key(&key));
                Ok(())
            }
            Ok(None) => {
                tracing::warn!("{} {} no longer exists", self.kind.type_name(), d.id());
                d.clear_id();
                Ok(())
            }
            Err(e) if e.status() == Some(404) => {
                tracing::warn!("{} {} not found: {}", self.kind.type_name(), d.id(), e);
                d.clear_id();
                Ok(())
            }
            Err(e) => {
                tracing::error!("read {}: {}", self.kind.type_name(), e);
                Err(e)
            }
        }
    }

    async fn do_update(&self, d: &mut ResourceData) -> Result<()> {
        tracing::debug!("in update");

        if let Some(field) = self
            .kind
            .immutable_fields()
            .iter()
            .find(|f| d.has_change(f))
        {
            return Err(ProviderError::ImmutableField {
                field: field.to_string(),
                message: format!("{} cannot be changed after creation", field),
            });
        }
        self.kind.customize_diff(d)?;
        self.kind.validate(d)?;

        if !self.kind.update_writes() {
            return self.do_read(d).await;
        }

        let key = self.kind.key_from_id(d.id(), d)?;
        let version = self.resolve_version(&key, true).await?;

        let key = self
            .kind
            .write(self.api.as_ref(), &key, version, d)
            .await
            .inspect_err(|e| tracing::error!("update {}: {}", self.kind.type_name(), e))?;

        d.set_id(self.kind.encode_key(&key));
        self.do_read(d).await
    }

    async fn do_delete(&self, d: &mut ResourceData) -> Result<()> {
        tracing::debug!("in delete");

        let key = self.kind.key_from_id(d.id(), d)?;
        let version = self.resolve_version(&key, true).await?;

        self.kind
            .reset(self.api.as_ref(), &key, version)
            .await
            .inspect_err(|e| tracing::error!("delete {}: {}", self.kind.type_name(), e))?;

        d.clear_id();
        Ok(())
    }
}

#[async_trait]
impl<R: ResourceKind> Lifecycle for Handler<R> {
    fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn create(&self, d: &mut ResourceData) -> Result<()> {
        let span = self.span("create");
        self.do_create(d).instrument(span).await
    }

    async fn read(&self, d: &mut ResourceData) -> Result<()> {
        let span = self.span("read");
        self.do_read(d).instrument(span).await
    }

    async fn update(&self, d: &mut ResourceData) -> Result<()> {
        let span = self.span("update");
        self.do_update(d).instrument(span).await
    }

    async fn delete(&self, d: &mut ResourceData) -> Result<()> {
        let span = self.span("delete");
        self.do_delete(d).instrument(span).await
    }

    async fn import(&self, id: &str) -> Result<ResourceData> {
        let mut d = ResourceData::from_state(self.schema.clone(), id, Default::default());
        self.read(&mut d).await?;
        if d.id().is_empty() {
            return Err(ProviderError::ResourceNotFound {
                type_name: self.kind.type_name().to_string(),
                id: id.to_string(),
            });
        }
        Ok(d)
    }

    fn plan(&self, d: &ResourceData) -> Result<Plan> {
        if d.id().is_empty() {
            return Ok(Plan::Create);
        }
        self.kind.customize_diff(d)?;
        Ok(plan(&self.schema, Some(d.prior()), d.attributes()))
    }
}
