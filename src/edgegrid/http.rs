//! HTTP utilities for EdgeGrid-signed REST calls

use super::auth::EdgeGridCredentials;
use crate::error::{ProviderError, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate long bodies and drop control characters before logging
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Pull the `detail` or `title` out of an RFC 7807 problem body
fn problem_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("title"))
                .and_then(|d| d.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| sanitize_for_log(body))
}

/// HTTP client wrapper that signs every request
#[derive(Clone)]
pub struct EdgeGridHttpClient {
    client: Client,
    credentials: EdgeGridCredentials,
    base_url: Url,
}

impl EdgeGridHttpClient {
    /// Create a client targeting `https://{credentials.host}`
    pub fn new(credentials: EdgeGridCredentials) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{}/", credentials.host))
            .map_err(|e| ProviderError::Config(format!("invalid host: {}", e)))?;
        Self::with_base_url(credentials, base_url)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(credentials: EdgeGridCredentials, base_url: Url) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("akamai-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ProviderError::Transport {
                operation: "build HTTP client".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            credentials,
            base_url,
        })
    }

    /// Resolve a path plus query pairs against the base URL
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ProviderError::Config(format!("invalid path '{}': {}", path, e)))?;

        let account_key = self.credentials.account_key.as_deref();
        if !query.is_empty() || account_key.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            if let Some(key) = account_key {
                pairs.append_pair("accountSwitchKey", key);
            }
        }

        Ok(url)
    }

    pub async fn get(&self, operation: &str, url: Url) -> Result<Value> {
        self.send(operation, Method::GET, url, None).await
    }

    pub async fn post(&self, operation: &str, url: Url, body: &Value) -> Result<Value> {
        self.send(operation, Method::POST, url, Some(body)).await
    }

    pub async fn put(&self, operation: &str, url: Url, body: &Value) -> Result<Value> {
        self.send(operation, Method::PUT, url, Some(body)).await
    }

    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {} ({})", method, url.path(), operation);

        let payload = match body {
            Some(body) => serde_json::to_vec(body).map_err(|source| ProviderError::Decode {
                operation: operation.to_string(),
                source,
            })?,
            None => Vec::new(),
        };

        let authorization = self.credentials.sign(method.as_str(), &url, &payload);

        let mut request = self
            .client
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::ACCEPT, "application/json");

        if body.is_some() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let transport = |source| ProviderError::Transport {
            operation: operation.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(ProviderError::Api {
                operation: operation.to_string(),
                status: status.as_u16(),
                detail: problem_detail(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|source| ProviderError::Decode {
            operation: operation.to_string(),
            source,
        })
    }
}

/// Decode a JSON value returned by [`EdgeGridHttpClient`] into a typed response
pub fn decode<T: serde::de::DeserializeOwned>(operation: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| ProviderError::Decode {
        operation: operation.to_string(),
        source,
    })
}

/// Format an API error for display
pub fn format_api_error(error: &ProviderError) -> String {
    match error.status() {
        Some(401) => "Authentication failed. Check the credentials in your .edgerc.".to_string(),
        Some(403) => "Permission denied. Check the API client's grants.".to_string(),
        Some(404) => "Resource not found.".to_string(),
        Some(409) => "Resource conflict. The configuration version may be locked.".to_string(),
        Some(429) => "Rate limit exceeded. Please try again later.".to_string(),
        Some(400) => format!("Invalid request. {}", error),
        Some(s) if s >= 500 => "Akamai API temporarily unavailable. Please try again.".to_string(),
        _ => error.to_string(),
    }
}
