//! Configuration Management
//!
//! Loads EdgeGrid API credentials from an `.edgerc` file, with environment
//! variables taking precedence over file values.

use crate::edgegrid::auth::{EdgeGridCredentials, DEFAULT_MAX_BODY};
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_SECTION: &str = "default";

/// Environment variables that override `.edgerc` values
const ENV_HOST: &str = "AKAMAI_HOST";
const ENV_CLIENT_TOKEN: &str = "AKAMAI_CLIENT_TOKEN";
const ENV_CLIENT_SECRET: &str = "AKAMAI_CLIENT_SECRET";
const ENV_ACCESS_TOKEN: &str = "AKAMAI_ACCESS_TOKEN";

/// `.edgerc` loader
pub struct EdgeRc;

impl EdgeRc {
    /// `$AKAMAI_EDGERC`, falling back to `~/.edgerc`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("AKAMAI_EDGERC") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".edgerc"))
    }

    /// Load credentials for `section`, applying environment overrides.
    ///
    /// A missing file is only an error when the environment does not supply
    /// every credential.
    pub fn load(path: Option<&Path>, section: &str) -> Result<EdgeGridCredentials> {
        if !validate_section_name(section) {
            bail!("Invalid .edgerc section name: {:?}", section);
        }

        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let values = match path {
            Some(ref p) if p.exists() => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("Failed to read {}", p.display()))?;
                parse_section(&content, section)
            }
            _ => HashMap::new(),
        };

        let lookup = |env: &str, key: &str| -> Option<String> {
            std::env::var(env)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| values.get(key).cloned())
        };

        let (Some(host), Some(client_token), Some(client_secret), Some(access_token)) = (
            lookup(ENV_HOST, "host"),
            lookup(ENV_CLIENT_TOKEN, "client_token"),
            lookup(ENV_CLIENT_SECRET, "client_secret"),
            lookup(ENV_ACCESS_TOKEN, "access_token"),
        ) else {
            bail!(
                "Incomplete credentials for section [{}]. Set host, client_token, client_secret and access_token in {} or via {}/{}/{}/{}",
                section,
                path.as_deref().map(|p| p.display().to_string()).unwrap_or_else(|| ".edgerc".into()),
                ENV_HOST,
                ENV_CLIENT_TOKEN,
                ENV_CLIENT_SECRET,
                ENV_ACCESS_TOKEN
            );
        };

        let max_body = match values.get("max_body") {
            Some(v) => v
                .parse()
                .with_context(|| format!("Invalid max_body value: {}", v))?,
            None => DEFAULT_MAX_BODY,
        };

        let credentials = EdgeGridCredentials::new(
            normalize_host(&host),
            client_token,
            client_secret,
            access_token,
        )
        .with_max_body(max_body)
        .with_account_key(values.get("account_key").cloned());

        credentials.validate()?;
        tracing::debug!("Loaded credentials for section [{}] host {}", section, credentials.host);
        Ok(credentials)
    }
}

/// Section names are used in messages and env lookups; keep them tame
fn validate_section_name(section: &str) -> bool {
    !section.is_empty()
        && section
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Hosts are sometimes pasted with a scheme or trailing slash
fn normalize_host(host: &str) -> String {
    host.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}

/// Collect `key = value` pairs of one INI section
fn parse_section(content: &str, section: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line[1..line.len() - 1].trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    values
}
