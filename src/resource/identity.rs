//! Resource identity codec
//!
//! Identities are the resource's key components joined by `:`, e.g.
//! `43253:AAAA_81230:1`. No escaping is done, so components must not
//! contain the delimiter themselves.

use crate::error::{ProviderError, Result};
use std::fmt;

pub const DELIMITER: &str = ":";

/// Join identity components
pub fn encode(parts: &[&dyn fmt::Display]) -> String {
    parts
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(DELIMITER)
}

/// Split an identity, requiring exactly `expected_count` components
pub fn decode(id: &str, expected_count: usize, expected_format: &str) -> Result<Vec<String>> {
    let parts: Vec<String> = id.split(DELIMITER).map(str::to_string).collect();
    if parts.len() != expected_count {
        return Err(ProviderError::InvalidId {
            id: id.to_string(),
            format: expected_format.to_string(),
        });
    }
    Ok(parts)
}

/// A decoded identity with typed component access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    raw: String,
    format: &'static str,
    parts: Vec<String>,
}

impl Identity {
    pub fn decode(id: &str, expected_count: usize, format: &'static str) -> Result<Self> {
        Ok(Self {
            raw: id.to_string(),
            format,
            parts: decode(id, expected_count, format)?,
        })
    }

    pub fn str(&self, index: usize) -> &str {
        &self.parts[index]
    }

    /// Component `index` parsed as an integer
    pub fn int(&self, index: usize) -> Result<i64> {
        self.parts[index]
            .parse()
            .map_err(|_| ProviderError::InvalidId {
                id: self.raw.clone(),
                format: self.format.to_string(),
            })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
