//! OpenAPI document access
//!
//! Read-only views over fetched interface documents: path resolution,
//! schema flattening, and the handful of operation attributes the
//! verification engine inspects.

pub mod flatten;
pub mod path;

pub use flatten::{flatten, flatten_with_prefix, MAX_SCHEMA_DEPTH};
pub use path::{ambiguous_templates, normalize, resolve, NormalizedPath};

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Content type whose schema is inspected
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A provider's fetched interface document
#[derive(Debug, Clone)]
pub struct InterfaceDocument {
    /// Provider name
    pub provider: String,

    /// URL the document was fetched from
    pub url: String,

    /// SHA-256 of the raw response body, hex encoded
    pub digest: String,

    /// Parsed document
    pub body: Value,
}

impl InterfaceDocument {
    /// Wrap a parsed document, hashing the raw bytes it came from
    pub fn new(provider: impl Into<String>, url: impl Into<String>, raw: &[u8], body: Value) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(raw);
        Self {
            provider: provider.into(),
            url: url.into(),
            digest: hex::encode(hasher.finalize()),
            body,
        }
    }

    /// Build a document from an in-memory value (digest over its serialization)
    pub fn from_value(provider: impl Into<String>, body: Value) -> Self {
        let raw = serde_json::to_vec(&body).unwrap_or_default();
        Self::new(provider, String::new(), &raw, body)
    }

    /// The `paths` object, empty when absent
    pub fn paths(&self) -> &Map<String, Value> {
        static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
        self.body
            .get("paths")
            .and_then(Value::as_object)
            .unwrap_or_else(|| EMPTY.get_or_init(Map::new))
    }

    /// Resolve an operation by path template and method
    pub fn operation(&self, path: &str, method: &str) -> Option<(&str, Operation<'_>)> {
        resolve(self.paths(), path, method).map(|(template, op)| (template, Operation::new(op)))
    }
}

/// View over one OpenAPI operation object
#[derive(Debug, Clone, Copy)]
pub struct Operation<'a> {
    raw: &'a Value,
}

impl<'a> Operation<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// Lowercased names of `in: header` parameters
    pub fn header_parameters(&self) -> Vec<String> {
        self.raw
            .get("parameters")
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter(|p| p.get("in").and_then(Value::as_str) == Some("header"))
                    .filter_map(|p| p.get("name").and_then(Value::as_str))
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether a `requestBody` key is declared at all
    pub fn declares_request_body(&self) -> bool {
        self.raw.get("requestBody").is_some()
    }

    /// The `requestBody` object
    pub fn request_body(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("requestBody").and_then(Value::as_object)
    }

    /// JSON schema of the request body
    pub fn request_schema(&self) -> Option<&'a Value> {
        self.request_body()
            .and_then(|body| body.get("content"))
            .and_then(json_schema)
    }

    /// The `responses` object, keyed by status code
    pub fn responses(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("responses").and_then(Value::as_object)
    }

    /// JSON schema of the response for `status`
    pub fn response_schema(&self, status: &str) -> Option<&'a Value> {
        self.responses()
            .and_then(|responses| responses.get(status))
            .filter(|response| response.is_object())
            .and_then(|response| response.get("content"))
            .and_then(json_schema)
    }

    /// The `security` requirement list, when declared as a list
    pub fn security(&self) -> Option<&'a Vec<Value>> {
        self.raw.get("security").and_then(Value::as_array)
    }
}

/// Schema under `content["application/json"].schema`, if it is an object
pub fn json_schema(content: &Value) -> Option<&Value> {
    content
        .get(JSON_CONTENT_TYPE)
        .filter(|media| media.is_object())
        .and_then(|media| media.get("schema"))
        .filter(|schema| schema.is_object())
}
