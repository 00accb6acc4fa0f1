//! Contract Runner Contracts
//!
//! Defines the consumer requirement set, queue message contracts, and the
//! outcome types produced when they are evaluated.
//!
//! A [`ContractSet`] is immutable configuration: it is loaded once at startup
//! (from the built-in PhotoX set or a YAML/JSON/TOML file) and validated before
//! any document is fetched.

mod outcomes;
mod queue;
mod requirements;

pub use outcomes::*;
pub use queue::*;
pub use requirements::*;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ContractSetError, Result};

/// Built-in PhotoX contract set
const BUILTIN_CONTRACTS: &str = include_str!("photox.yaml");

/// Complete contract configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSet {
    /// Providers whose interface documents are fetched
    pub providers: Vec<ProviderSpec>,

    /// Consumer requirements, evaluated in order
    #[serde(default)]
    pub requirements: Vec<ContractRequirement>,

    /// Source-level proofs accepted for header requirements
    #[serde(default)]
    pub header_proofs: Vec<HeaderProof>,

    /// Queue message contracts
    #[serde(default)]
    pub queues: Vec<QueueContractSpec>,
}

impl ContractSet {
    /// Load the built-in contract set
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_CONTRACTS)
    }

    /// Parse and validate a YAML contract set
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let set: ContractSet = serde_yaml::from_str(content)?;
        set.validated()
    }

    /// Parse and validate a JSON contract set
    pub fn from_json_str(content: &str) -> Result<Self> {
        let set: ContractSet = serde_json::from_str(content)?;
        set.validated()
    }

    /// Parse and validate a TOML contract set
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let set: ContractSet = toml::from_str(content)?;
        set.validated()
    }

    /// Load a contract set file, choosing the format by extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ContractSetError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }

    /// Look up a provider by name
    pub fn provider(&self, name: &str) -> Option<&ProviderSpec> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Proof registered for a header, if any
    pub fn header_proof(&self, header: &str) -> Option<&HeaderProof> {
        self.header_proofs
            .iter()
            .find(|p| p.header.eq_ignore_ascii_case(header))
    }

    /// Normalize casing and enforce structural invariants
    fn validated(mut self) -> Result<Self> {
        let mut names = HashSet::new();
        for provider in &self.providers {
            if provider.name.is_empty() {
                return Err(ContractSetError::invalid("provider name must not be empty"));
            }
            if !provider.openapi_path.starts_with('/') {
                return Err(ContractSetError::invalid(format!(
                    "provider '{}' openapi_path must start with '/'",
                    provider.name
                )));
            }
            if !names.insert(provider.name.clone()) {
                return Err(ContractSetError::DuplicateProvider(provider.name.clone()));
            }
        }

        for requirement in &mut self.requirements {
            requirement.method = requirement.method.to_lowercase();
            requirement.request_headers = requirement
                .request_headers
                .iter()
                .map(|h| h.to_lowercase())
                .collect();

            if !HTTP_METHODS.contains(&requirement.method.as_str()) {
                return Err(ContractSetError::invalid(format!(
                    "requirement '{}' uses unsupported method '{}'",
                    requirement.identity(),
                    requirement.method
                )));
            }
            if !requirement.path.starts_with('/') {
                return Err(ContractSetError::invalid(format!(
                    "requirement '{}' path must start with '/'",
                    requirement.identity()
                )));
            }
            if !names.contains(&requirement.provider) {
                return Err(ContractSetError::UnknownProvider {
                    requirement: requirement.identity(),
                    provider: requirement.provider.clone(),
                });
            }
        }

        for proof in &mut self.header_proofs {
            proof.header = proof.header.to_lowercase();
            if proof.pattern.is_empty() || proof.min_occurrences == 0 {
                return Err(ContractSetError::invalid(format!(
                    "header proof for '{}' needs a pattern and min_occurrences > 0",
                    proof.header
                )));
            }
        }

        for queue in &self.queues {
            if queue.required_keys.is_empty() {
                return Err(ContractSetError::invalid(format!(
                    "queue contract '{}' has no required keys",
                    queue.name
                )));
            }
            Regex::new(&queue.payload_anchor).map_err(|e| {
                ContractSetError::invalid(format!(
                    "queue contract '{}' has an invalid payload_anchor: {}",
                    queue.name, e
                ))
            })?;
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
providers:
  - name: auth
    openapi_path: /api/v1/auth/openapi.json
requirements:
  - provider: auth
    method: POST
    path: /api/v1/auth/login
    request_headers: [Content-Type]
"#;

    #[test]
    fn test_builtin_set_loads() {
        let set = ContractSet::builtin().expect("built-in set must be valid");
        assert_eq!(set.providers.len(), 3);
        assert_eq!(set.requirements.len(), 21);
        assert_eq!(set.queues.len(), 1);
        assert_eq!(
            set.queues[0].required_keys,
            vec!["mediaId", "ownerId", "relativePath", "checksumSha256", "uploadedAt"]
        );
        assert!(set.header_proof("Idempotency-Key").is_some());
    }

    #[test]
    fn test_builtin_requirements_reference_declared_providers() {
        let set = ContractSet::builtin().unwrap();
        for requirement in &set.requirements {
            assert!(set.provider(&requirement.provider).is_some());
        }
    }

    #[test]
    fn test_methods_and_headers_are_lowercased() {
        let set = ContractSet::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(set.requirements[0].method, "post");
        assert_eq!(set.requirements[0].request_headers, vec!["content-type"]);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let content = r#"
providers:
  - name: auth
    openapi_path: /api/v1/auth/openapi.json
requirements:
  - provider: search
    method: get
    path: /api/v1/search
"#;
        let err = ContractSet::from_yaml_str(content).unwrap_err();
        assert!(matches!(
            err,
            ContractSetError::UnknownProvider { ref provider, .. } if provider == "search"
        ));
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let content = r#"
providers:
  - name: auth
    openapi_path: /a.json
  - name: auth
    openapi_path: /b.json
"#;
        let err = ContractSet::from_yaml_str(content).unwrap_err();
        assert!(matches!(err, ContractSetError::DuplicateProvider(_)));
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let content = MINIMAL.replace("POST", "FETCH");
        assert!(ContractSet::from_yaml_str(&content).is_err());
    }

    #[test]
    fn test_json_and_toml_formats() {
        let json = r#"{
            "providers": [{"name": "library", "openapi_path": "/api/v1/library/openapi.json"}],
            "requirements": [{"provider": "library", "method": "get", "path": "/api/v1/library/timeline"}]
        }"#;
        assert_eq!(ContractSet::from_json_str(json).unwrap().requirements.len(), 1);

        let toml = r#"
[[providers]]
name = "library"
openapi_path = "/api/v1/library/openapi.json"

[[requirements]]
provider = "library"
method = "get"
path = "/api/v1/library/timeline"
security_scheme = "bearerAuth"
"#;
        let set = ContractSet::from_toml_str(toml).unwrap();
        assert_eq!(
            set.requirements[0].security_scheme.as_deref(),
            Some("bearerAuth")
        );
    }

    #[test]
    fn test_document_url_joins_base() {
        let provider = ProviderSpec::new("auth", "/api/v1/auth/openapi.json");
        assert_eq!(
            provider.document_url("http://localhost/"),
            "http://localhost/api/v1/auth/openapi.json"
        );
    }
}
