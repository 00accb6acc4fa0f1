//! Schema accessor
//!
//! Fetches provider OpenAPI documents over HTTP. A document is returned only
//! for a 200 response with a well-formed JSON body; every other outcome is a
//! [`FetchError`]. Retrying is the caller's business.

use std::time::Duration;

use crate::contracts::ProviderSpec;
use crate::schema::InterfaceDocument;

/// Default fetch timeout, matching the CLI default
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Interface document client
#[derive(Debug, Clone)]
pub struct SchemaClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl SchemaClient {
    /// Create a client with the given per-request timeout in seconds
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        if timeout_secs == 0 {
            return Err(FetchError::InvalidTimeout);
        }
        let timeout = Duration::from_secs(timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch and parse a document from an absolute URL
    pub async fn fetch(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        self.fetch_raw(url).await.map(|(_, body)| body)
    }

    /// Fetch a provider's document from `base_url`
    pub async fn fetch_provider(
        &self,
        provider: &ProviderSpec,
        base_url: &str,
    ) -> Result<InterfaceDocument, FetchError> {
        let url = provider.document_url(base_url);
        let (raw, body) = self.fetch_raw(&url).await?;
        tracing::debug!(provider = %provider.name, url = %url, bytes = raw.len(), "document fetched");
        Ok(InterfaceDocument::new(&provider.name, url, &raw, body))
    }

    async fn fetch_raw(&self, url: &str) -> Result<(Vec<u8>, serde_json::Value), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(url, self.timeout, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(url, self.timeout, e))?;

        let body = serde_json::from_slice(&raw).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok((raw.to_vec(), body))
    }
}

/// Fetch a document once with a throwaway client
pub async fn fetch(url: &str, timeout_secs: u64) -> Result<serde_json::Value, FetchError> {
    SchemaClient::new(timeout_secs)?.fetch(url).await
}

/// Document fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to load {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("Timed out after {timeout_secs}s loading {url}")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("Expected HTTP 200 from {url}, got {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed JSON from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("Fetch timeout must be greater than zero")]
    InvalidTimeout,

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FetchError {
    fn from_transport(url: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        } else {
            FetchError::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// URL the error refers to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            FetchError::Unreachable { url, .. }
            | FetchError::Timeout { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Malformed { url, .. } => Some(url),
            FetchError::InvalidTimeout | FetchError::Client(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(SchemaClient::new(0), Err(FetchError::InvalidTimeout)));
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            url: "http://localhost/api/v1/auth/openapi.json".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Expected HTTP 200 from http://localhost/api/v1/auth/openapi.json, got 503"
        );
        assert_eq!(err.url(), Some("http://localhost/api/v1/auth/openapi.json"));
    }
}
