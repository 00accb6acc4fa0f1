//! Evaluation outcome types
//!
//! Per-requirement, per-check results produced by the verification engine and
//! the flattened violation list derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ContractRequirement;

/// Checks run against every requirement, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    OperationExists,
    RequestHeaders,
    RequestFields,
    ResponseFields,
    Security,
    ErrorEnvelope,
}

impl CheckName {
    /// Fixed evaluation order
    pub const ORDER: [CheckName; 6] = [
        CheckName::OperationExists,
        CheckName::RequestHeaders,
        CheckName::RequestFields,
        CheckName::ResponseFields,
        CheckName::Security,
        CheckName::ErrorEnvelope,
    ];

    /// Label printed in the console report
    pub fn label(&self) -> &'static str {
        match self {
            CheckName::OperationExists => "operation exists",
            CheckName::RequestHeaders => "request headers",
            CheckName::RequestFields => "request fields",
            CheckName::ResponseFields => "response fields",
            CheckName::Security => "security",
            CheckName::ErrorEnvelope => "error envelope",
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail(Vec<String>),
    Skip,
}

impl CheckStatus {
    /// Build a status from a list of violation messages
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail(errors)
        }
    }

    /// Console keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail(_) => "FAIL",
            CheckStatus::Skip => "SKIP",
        }
    }

    /// Violation messages (empty unless failed)
    pub fn errors(&self) -> &[String] {
        match self {
            CheckStatus::Fail(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail(_))
    }
}

/// One check applied to one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: CheckName,
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl CheckOutcome {
    pub fn new(check: CheckName, status: CheckStatus) -> Self {
        Self { check, status }
    }
}

/// A violation: which requirement, which check, what is wrong
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Requirement identity (`auth POST /api/v1/auth/login`) or queue contract name
    pub requirement: String,

    /// Check that produced the violation
    pub check: String,

    /// Human-readable detail
    pub message: String,
}

impl Violation {
    pub fn new(
        requirement: impl Into<String>,
        check: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            requirement: requirement.into(),
            check: check.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.requirement, self.message)
    }
}

/// All check results for one requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementOutcome {
    pub requirement: ContractRequirement,

    /// Document template the requirement resolved to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<String>,

    pub checks: Vec<CheckOutcome>,
}

impl RequirementOutcome {
    /// True when no check failed
    pub fn passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status.is_failure())
    }

    /// True when the operation could not be found in the document
    pub fn is_missing_operation(&self) -> bool {
        self.checks
            .iter()
            .any(|c| c.check == CheckName::OperationExists && c.status.is_failure())
    }

    /// Violations in check order
    pub fn violations(&self) -> Vec<Violation> {
        let identity = self.requirement.identity();
        let mut violations = Vec::new();
        for outcome in &self.checks {
            for message in outcome.status.errors() {
                violations.push(Violation::new(
                    identity.clone(),
                    outcome.check.label(),
                    message.clone(),
                ));
            }
        }
        violations
    }
}

/// Outcome of evaluating the whole requirement set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiOutcome {
    pub requirements: Vec<RequirementOutcome>,

    /// Path templates that normalize identically for the same method
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_templates: Vec<String>,
}

impl ApiOutcome {
    pub fn total(&self) -> usize {
        self.requirements.len()
    }

    pub fn passed_count(&self) -> usize {
        self.requirements.iter().filter(|r| r.passed()).count()
    }

    pub fn is_success(&self) -> bool {
        self.requirements.iter().all(RequirementOutcome::passed)
    }

    /// Every violation across every requirement
    pub fn violations(&self) -> Vec<Violation> {
        self.requirements
            .iter()
            .flat_map(RequirementOutcome::violations)
            .collect()
    }
}
