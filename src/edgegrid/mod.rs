//! Akamai OPEN API interaction module
//!
//! # Module Structure
//!
//! - [`auth`] - EdgeGrid credentials and EG1-HMAC-SHA256 request signing
//! - [`http`] - signed HTTP transport and error formatting
//! - [`client`] - URL helpers and the remote API trait implementations
//!
//! # Example
//!
//! ```ignore
//! use akamai_provider::config::EdgeRc;
//! use akamai_provider::edgegrid::EdgeGridClient;
//!
//! let creds = EdgeRc::load(None, "default")?;
//! let client = EdgeGridClient::new(creds)?;
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use auth::EdgeGridCredentials;
pub use client::EdgeGridClient;
pub use http::format_api_error;
