//! Verification engine
//!
//! Evaluates consumer requirements against provider interface documents.
//! For each requirement the checks run in a fixed order (existence, headers,
//! request fields, response fields, security, error envelope); only a missing
//! operation short-circuits. Every violation of every requirement is
//! collected before the outcome is returned.

mod checks;

pub use checks::*;

use std::collections::BTreeMap;

use crate::contracts::*;
use crate::proof::SourceProofs;
use crate::schema::{ambiguous_templates, InterfaceDocument, Operation};

/// Shared inputs available to every check
pub struct CheckContext<'a> {
    pub proofs: &'a SourceProofs,
}

/// Trait for contract checks
pub trait ContractCheck: Send + Sync {
    /// Check identifier
    fn name(&self) -> CheckName;

    /// Whether the requirement asks for this check; otherwise it is skipped
    fn applies_to(&self, requirement: &ContractRequirement) -> bool;

    /// Evaluate the operation and return violation messages
    fn evaluate(
        &self,
        requirement: &ContractRequirement,
        operation: Operation<'_>,
        ctx: &CheckContext<'_>,
    ) -> Vec<String>;
}

/// Engine errors; these abort evaluation before any check runs
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("No interface document for provider '{provider}' (required by {requirement})")]
    UnresolvedProvider {
        provider: String,
        requirement: String,
    },
}

/// Contract verification engine
pub struct VerificationEngine {
    checks: Vec<Box<dyn ContractCheck>>,
    proofs: SourceProofs,
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new(SourceProofs::none())
    }
}

impl VerificationEngine {
    /// Create engine with the standard checks
    pub fn new(proofs: SourceProofs) -> Self {
        Self {
            checks: vec![
                Box::new(RequestHeadersCheck),
                Box::new(RequestFieldsCheck),
                Box::new(ResponseFieldsCheck),
                Box::new(SecurityCheck),
                Box::new(ErrorEnvelopeCheck),
            ],
            proofs,
        }
    }

    /// Evaluate one requirement against its provider's document
    pub fn evaluate_requirement(
        &self,
        requirement: &ContractRequirement,
        document: &InterfaceDocument,
    ) -> RequirementOutcome {
        let Some((template, operation)) = document.operation(&requirement.path, &requirement.method)
        else {
            tracing::debug!(requirement = %requirement, "operation missing");
            return RequirementOutcome {
                requirement: requirement.clone(),
                resolved_path: None,
                checks: vec![CheckOutcome::new(
                    CheckName::OperationExists,
                    CheckStatus::Fail(vec!["missing operation".to_string()]),
                )],
            };
        };

        let ctx = CheckContext {
            proofs: &self.proofs,
        };
        let mut checks = vec![CheckOutcome::new(CheckName::OperationExists, CheckStatus::Pass)];

        for check in &self.checks {
            let status = if check.applies_to(requirement) {
                CheckStatus::from_errors(check.evaluate(requirement, operation, &ctx))
            } else {
                CheckStatus::Skip
            };
            tracing::debug!(
                requirement = %requirement,
                check = %check.name(),
                status = status.keyword(),
                "check evaluated"
            );
            checks.push(CheckOutcome::new(check.name(), status));
        }

        RequirementOutcome {
            requirement: requirement.clone(),
            resolved_path: Some(template.to_string()),
            checks,
        }
    }

    /// Evaluate every requirement
    ///
    /// Fails before evaluating anything when a requirement names a provider
    /// with no document.
    pub fn evaluate(
        &self,
        requirements: &[ContractRequirement],
        documents: &BTreeMap<String, InterfaceDocument>,
    ) -> Result<ApiOutcome, EngineError> {
        if let Some(orphan) = requirements
            .iter()
            .find(|r| !documents.contains_key(&r.provider))
        {
            return Err(EngineError::UnresolvedProvider {
                provider: orphan.provider.clone(),
                requirement: orphan.identity(),
            });
        }

        let mut ambiguous = Vec::new();
        for (provider, document) in documents {
            for entry in ambiguous_templates(document.paths()) {
                tracing::warn!(provider = %provider, templates = %entry, "ambiguous path templates in document");
                ambiguous.push(format!("{}: {}", provider, entry));
            }
        }

        let outcomes = requirements
            .iter()
            .map(|requirement| {
                // Presence checked above
                let document = &documents[&requirement.provider];
                self.evaluate_requirement(requirement, document)
            })
            .collect();

        Ok(ApiOutcome {
            requirements: outcomes,
            ambiguous_templates: ambiguous,
        })
    }
}
