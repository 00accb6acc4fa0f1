//! Queue message contract types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Violation;

/// Required key set of an asynchronous message and the two artifacts that
/// must both demonstrate it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueContractSpec {
    /// Message name, e.g. `media.process`
    pub name: String,

    /// Producing service
    pub producer: String,

    /// Consuming service
    pub consumer: String,

    /// Producer source file, relative to the project root
    pub source: PathBuf,

    /// Documentation file, relative to the project root
    pub docs: PathBuf,

    /// Quoted message type tag the producer must reference
    pub message_tag: String,

    /// Regex locating the payload literal; its match must end at or before the
    /// opening brace of the payload block
    pub payload_anchor: String,

    /// Keys every payload must carry, in report order
    pub required_keys: Vec<String>,
}

/// One queue check line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCheck {
    pub label: String,
    pub passed: bool,

    /// Violation detail, present when the check failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl QueueCheck {
    pub fn pass(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: true,
            detail: None,
        }
    }

    pub fn fail(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }

    /// Pass or fail depending on `ok`
    pub fn from_bool(label: impl Into<String>, ok: bool, detail: impl Into<String>) -> Self {
        if ok {
            Self::pass(label)
        } else {
            Self::fail(label, detail)
        }
    }
}

/// All checks for one queue contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueOutcome {
    pub contract: String,
    pub producer: String,
    pub consumer: String,
    pub checks: Vec<QueueCheck>,
}

impl QueueOutcome {
    pub fn total(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn is_success(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn violations(&self) -> Vec<Violation> {
        self.checks
            .iter()
            .filter_map(|check| {
                check
                    .detail
                    .as_ref()
                    .map(|detail| Violation::new(self.contract.clone(), check.label.clone(), detail.clone()))
            })
            .collect()
    }
}
