//! Provider errors
//!
//! Every fatal condition a lifecycle operation can hit is one variant here.
//! Non-fatal conditions (output rendering) never reach this type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// Field absent from the record
    #[error("value not found: {0}")]
    NotFound(String),

    /// Field present but holding the wrong type
    #[error("invalid type: {field}, {expected:?}")]
    InvalidType { field: String, expected: &'static str },

    /// Writing a field the schema does not declare, or with the wrong type
    #[error("setting value: {field}: {reason}")]
    ValueSet { field: String, reason: String },

    /// Identity string could not be decoded
    #[error("ID '{id}' incorrectly formatted: necessary format: {format}")]
    InvalidId { id: String, format: String },

    /// Field-level or cross-field validation failed
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Change of a field that cannot be modified after creation
    #[error("attempting to modify {field}: {message}")]
    ImmutableField { field: String, message: String },

    /// Remote API returned a non-success status
    #[error("API error {status} calling '{operation}': {detail}")]
    Api {
        operation: String,
        status: u16,
        detail: String,
    },

    /// Remote call failed before a response was received
    #[error("request failed calling '{operation}': {source}")]
    Transport {
        operation: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote response body could not be decoded
    #[error("decoding response of '{operation}': {source}")]
    Decode {
        operation: String,
        #[source]
        source: serde_json::Error,
    },

    /// Version resolution produced a version that is active on a network
    #[error("config {config_id} version {version} is active and cannot be modified")]
    ActiveVersion { config_id: i64, version: i64 },

    /// Remote entity behind an identity does not exist
    #[error("{type_name} '{id}' not found")]
    ResourceNotFound { type_name: String, id: String },

    /// Resource type not known to the provider
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected,
        }
    }

    /// HTTP status when the error came from the remote API
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// A user-facing diagnostic attached to an operation and optionally a field
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let attribute = match err {
            ProviderError::NotFound(field) => Some(field.clone()),
            ProviderError::InvalidType { field, .. }
            | ProviderError::ValueSet { field, .. }
            | ProviderError::Validation { field, .. }
            | ProviderError::ImmutableField { field, .. } => Some(field.clone()),
            _ => None,
        };
        Self {
            summary: err.to_string(),
            attribute,
        }
    }
}
