//! Akamai resource provider
//!
//! Declarative create/read/update/delete lifecycles for Application
//! Security and Property Manager resources, backed by EdgeGrid-signed calls
//! to the Akamai OPEN APIs.
//!
//! - [`api`] - request/response types and the per-resource API traits
//! - [`edgegrid`] - signed HTTP client implementing those traits
//! - [`framework`] - schema, resource record and planning
//! - [`resource`] - resource handlers and the provider registry
//! - [`config`] - `.edgerc` credentials
//! - [`state`] - manifest and state files driven by the CLI

pub mod api;
pub mod config;
pub mod edgegrid;
pub mod error;
pub mod framework;
pub mod resource;
pub mod state;

pub use error::{Diagnostic, ProviderError, Result};
pub use resource::Provider;
