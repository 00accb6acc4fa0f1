//! Consumer requirement types
//!
//! Declarative statements of what a consumer expects a provider operation to
//! expose. Loaded once with the contract set and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// HTTP methods an OpenAPI path item may declare
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A provider service and the location of its interface document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    /// Provider identifier referenced by requirements
    pub name: String,

    /// Path of the OpenAPI document, appended to the base URL
    pub openapi_path: String,
}

impl ProviderSpec {
    /// Create a provider spec
    pub fn new(name: impl Into<String>, openapi_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            openapi_path: openapi_path.into(),
        }
    }

    /// Absolute document URL for the given base URL
    pub fn document_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.openapi_path)
    }
}

/// One consumer-expected operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRequirement {
    /// Provider that must expose the operation
    pub provider: String,

    /// HTTP method (stored lowercase once the set is loaded)
    pub method: String,

    /// Path template, e.g. `/api/v1/media/{mediaId}`
    pub path: String,

    /// Request headers the consumer sends
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_headers: Vec<String>,

    /// Dotted request body field paths the consumer sends
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_fields: Vec<String>,

    /// Dotted response body field paths the consumer reads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_fields: Vec<String>,

    /// Security scheme the operation must declare
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_scheme: Option<String>,
}

impl ContractRequirement {
    /// Create a requirement with no field, header or security expectations
    pub fn new(
        provider: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            method: method.into().to_lowercase(),
            path: path.into(),
            request_headers: Vec::new(),
            request_fields: Vec::new(),
            response_fields: Vec::new(),
            security_scheme: None,
        }
    }

    /// Set required request headers
    pub fn with_request_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Set required request fields
    pub fn with_request_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set required response fields
    pub fn with_response_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.response_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set required security scheme
    pub fn with_security_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.security_scheme = Some(scheme.into());
        self
    }

    /// Identity used in violation messages: `auth POST /api/v1/auth/login`
    pub fn identity(&self) -> String {
        format!(
            "{} {} {}",
            self.provider,
            self.method.to_uppercase(),
            self.path
        )
    }

    /// Console label: `[api][auth] POST /api/v1/auth/login`
    pub fn label(&self) -> String {
        format!(
            "[api][{}] {} {}",
            self.provider,
            self.method.to_uppercase(),
            self.path
        )
    }
}

impl fmt::Display for ContractRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}

/// Alternative source-level proof for a header requirement
///
/// When the published schema does not declare a header parameter, the header
/// requirement still holds if the producing service's source contains the
/// enforcement pattern at least `min_occurrences` times (one per mutating
/// call site).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderProof {
    /// Header name (matched case-insensitively)
    pub header: String,

    /// Source artifact, relative to the project root
    pub artifact: PathBuf,

    /// Literal call-site pattern to count
    pub pattern: String,

    /// Minimum number of occurrences
    #[serde(default = "default_min_occurrences")]
    pub min_occurrences: usize,
}

fn default_min_occurrences() -> usize {
    2
}
