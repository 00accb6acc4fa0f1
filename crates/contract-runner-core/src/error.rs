//! Error types for contract set loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a contract set
#[derive(Error, Debug)]
pub enum ContractSetError {
    /// The contract set file could not be read
    #[error("Failed to read contract set '{path}': {message}")]
    Io { path: PathBuf, message: String },

    /// The contract set could not be deserialized
    #[error("Parse error ({format}): {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// A requirement names a provider with no interface document
    #[error("Requirement '{requirement}' references undeclared provider '{provider}'")]
    UnknownProvider {
        requirement: String,
        provider: String,
    },

    /// Two providers share a name
    #[error("Provider '{0}' is declared more than once")]
    DuplicateProvider(String),

    /// Any other structural problem
    #[error("Invalid contract set: {0}")]
    Invalid(String),
}

impl ContractSetError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ContractSetError::Invalid(msg.into())
    }
}

impl From<serde_yaml::Error> for ContractSetError {
    fn from(err: serde_yaml::Error) -> Self {
        ContractSetError::Parse {
            format: "yaml",
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ContractSetError {
    fn from(err: serde_json::Error) -> Self {
        ContractSetError::Parse {
            format: "json",
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ContractSetError {
    fn from(err: toml::de::Error) -> Self {
        ContractSetError::Parse {
            format: "toml",
            message: err.to_string(),
        }
    }
}

/// Result type alias for contract set operations
pub type Result<T> = std::result::Result<T, ContractSetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ContractSetError::UnknownProvider {
            requirement: "search GET /api/v1/search".to_string(),
            provider: "search".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Requirement 'search GET /api/v1/search' references undeclared provider 'search'"
        );
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: ContractSetError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ContractSetError::Parse { format: "json", .. }));
    }
}
