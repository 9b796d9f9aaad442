//! Resource abstraction layer
//!
//! Each resource type is a small descriptor ([`ResourceKind`]) plugged into
//! one generic lifecycle ([`Handler`]). The [`Provider`] registry holds a
//! handler per type and hands out [`Lifecycle`] trait objects.
//!
//! # Architecture
//!
//! - [`identity`] - colon-delimited resource identities
//! - [`version`] - latest / modifiable configuration versions
//! - [`handler`] - the create/read/update/delete/import/plan shape
//! - [`validate`] - field validators, the ID-unchanged check, JSON diff suppression
//! - [`render`] - `output_text` templates
//!
//! # Example
//!
//! ```ignore
//! use akamai_provider::resource::Provider;
//!
//! async fn read_rule(provider: &Provider) -> akamai_provider::error::Result<()> {
//!     let rules = provider.resource("akamai_appsec_eval_rule")?;
//!     let d = rules.import("43253:AAAA_81230:1").await?;
//!     println!("{:?}", d.attributes());
//!     Ok(())
//! }
//! ```

mod api_request_constraints;
mod cp_code;
mod eval_rule;
pub mod handler;
pub mod identity;
mod ip_geo_protection;
mod registry;
pub mod render;
pub mod validate;
pub mod version;

pub use api_request_constraints::{ApiRequestConstraints, ConstraintKey};
pub use cp_code::{CpCodeKey, CpCodeResource};
pub use eval_rule::{EvalRule, EvalRuleKey};
pub use handler::{Handler, Lifecycle, ResourceKind};
pub use ip_geo_protection::{IpGeoProtection, PolicyKey};
pub use registry::{builtin_schemas, Provider};
pub use version::VersionResolver;
