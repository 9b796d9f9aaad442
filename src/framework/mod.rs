//! Configuration engine contract
//!
//! The pieces a declarative engine hands to resource handlers: schema
//! declarations, the per-resource record, and planning.
//!
//! - [`schema`] - attribute declarations, validation and defaults
//! - [`data`] - the resource record handlers read from and write to
//! - [`diff`] - attribute diffing with suppression and force-new handling

pub mod data;
pub mod diff;
pub mod schema;

pub use data::ResourceData;
pub use diff::{diff, plan, AttributeChange, Plan};
pub use schema::{Field, FieldType, Presence, Schema};
