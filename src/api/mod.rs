//! Remote API contracts
//!
//! Typed requests and responses plus one narrow trait per concern, so each
//! resource handler is handed exactly the operations it calls.
//!
//! - [`appsec`] - configuration versions, eval rules, policy protections,
//!   API request constraints
//! - [`papi`] - CP codes

pub mod appsec;
pub mod papi;

pub use appsec::*;
pub use papi::*;
