//! EdgeGrid Authentication
//!
//! Signs requests with the EG1-HMAC-SHA256 scheme used by Akamai OPEN APIs.
//! A signature covers the method, URL, a hash of POST bodies, and a
//! timestamp/nonce pair, keyed by a per-request signing key derived from the
//! client secret.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

use crate::error::{ProviderError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Largest body prefix covered by the content hash
pub const DEFAULT_MAX_BODY: usize = 131072;

const SCHEME: &str = "EG1-HMAC-SHA256";

/// API client credentials, one `.edgerc` section
#[derive(Clone)]
pub struct EdgeGridCredentials {
    pub host: String,
    pub client_token: String,
    client_secret: String,
    pub access_token: String,
    pub max_body: usize,
    /// Account switch key for multi-account API clients
    pub account_key: Option<String>,
}

impl fmt::Debug for EdgeGridCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeGridCredentials")
            .field("host", &self.host)
            .field("client_token", &self.client_token)
            .field("client_secret", &"[redacted]")
            .field("access_token", &self.access_token)
            .field("max_body", &self.max_body)
            .field("account_key", &self.account_key)
            .finish()
    }
}

impl EdgeGridCredentials {
    pub fn new(
        host: impl Into<String>,
        client_token: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            client_token: client_token.into(),
            client_secret: client_secret.into(),
            access_token: access_token.into(),
            max_body: DEFAULT_MAX_BODY,
            account_key: None,
        }
    }

    pub fn with_account_key(mut self, account_key: Option<String>) -> Self {
        self.account_key = account_key.filter(|k| !k.is_empty());
        self
    }

    pub fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }

    /// Reject incomplete credentials and hosts that carry a scheme or path
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("host", &self.host),
            ("client_token", &self.client_token),
            ("client_secret", &self.client_secret),
            ("access_token", &self.access_token),
        ] {
            if value.trim().is_empty() {
                return Err(ProviderError::Config(format!("{} is required", name)));
            }
        }
        if self.host.contains("://") || self.host.contains('/') {
            return Err(ProviderError::Config(format!(
                "host must be a bare hostname, got '{}'",
                self.host
            )));
        }
        Ok(())
    }

    /// Build the Authorization header value for a request
    pub fn sign(&self, method: &str, url: &Url, body: &[u8]) -> String {
        let nonce = uuid::Uuid::new_v4().to_string();
        self.sign_with(method, url, body, &format_timestamp(Utc::now()), &nonce)
    }

    pub(crate) fn sign_with(
        &self,
        method: &str,
        url: &Url,
        body: &[u8],
        timestamp: &str,
        nonce: &str,
    ) -> String {
        let auth_header = format!(
            "{} client_token={};access_token={};timestamp={};nonce={};",
            SCHEME, self.client_token, self.access_token, timestamp, nonce
        );

        let signing_key = hmac_base64(self.client_secret.as_bytes(), timestamp.as_bytes());

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        let host = match url.port() {
            Some(port) => format!("{}:{}", url.host_str().unwrap_or_default(), port),
            None => url.host_str().unwrap_or_default().to_string(),
        };

        let data_to_sign = [
            method.to_uppercase(),
            url.scheme().to_string(),
            host,
            path,
            String::new(),
            self.content_hash(method, body),
            auth_header.clone(),
        ]
        .join("\t");

        let signature = hmac_base64(signing_key.as_bytes(), data_to_sign.as_bytes());
        format!("{}signature={}", auth_header, signature)
    }

    /// Only POST bodies are hashed, truncated to `max_body`
    fn content_hash(&self, method: &str, body: &[u8]) -> String {
        if !method.eq_ignore_ascii_case("POST") || body.is_empty() {
            return String::new();
        }
        let covered = &body[..body.len().min(self.max_body)];
        STANDARD.encode(Sha256::digest(covered))
    }
}

/// EdgeGrid timestamp format, always UTC
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H:%M:%S+0000").to_string()
}

fn hmac_base64(key: &[u8], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    STANDARD.encode(mac.finalize().into_bytes())
}
