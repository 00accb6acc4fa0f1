//! Source-level header proofs
//!
//! Some guarantees live in code rather than in the published schema: a
//! service may read a header procedurally instead of declaring it as a
//! parameter. A [`HeaderProof`] accepts such a header when its enforcement
//! pattern occurs often enough in the producing service's source.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::contracts::HeaderProof;

/// Result of evaluating one proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProofResult {
    pub header: String,
    pub artifact: PathBuf,
    pub occurrences: usize,
    pub required: usize,
}

impl ProofResult {
    pub fn holds(&self) -> bool {
        self.occurrences >= self.required
    }
}

/// Evaluated proofs, keyed by lowercase header name
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceProofs {
    results: BTreeMap<String, ProofResult>,
}

impl SourceProofs {
    /// No proofs; every header must be declared in the schema
    pub fn none() -> Self {
        Self::default()
    }

    /// Evaluate proofs against artifacts under `root`
    ///
    /// An unreadable artifact counts as zero occurrences.
    pub fn evaluate(proofs: &[HeaderProof], root: &Path) -> Self {
        let mut results = BTreeMap::new();
        for proof in proofs {
            let path = root.join(&proof.artifact);
            let occurrences = match std::fs::read_to_string(&path) {
                Ok(source) => count_occurrences(&source, &proof.pattern),
                Err(e) => {
                    tracing::warn!(
                        header = %proof.header,
                        artifact = %path.display(),
                        error = %e,
                        "header proof artifact unreadable"
                    );
                    0
                }
            };
            results.insert(
                proof.header.to_lowercase(),
                ProofResult {
                    header: proof.header.to_lowercase(),
                    artifact: proof.artifact.clone(),
                    occurrences,
                    required: proof.min_occurrences,
                },
            );
        }
        Self { results }
    }

    /// Evaluate proofs against in-memory sources keyed by artifact path
    pub fn evaluate_sources(proofs: &[HeaderProof], sources: &BTreeMap<PathBuf, String>) -> Self {
        let results = proofs
            .iter()
            .map(|proof| {
                let occurrences = sources
                    .get(&proof.artifact)
                    .map(|source| count_occurrences(source, &proof.pattern))
                    .unwrap_or(0);
                (
                    proof.header.to_lowercase(),
                    ProofResult {
                        header: proof.header.to_lowercase(),
                        artifact: proof.artifact.clone(),
                        occurrences,
                        required: proof.min_occurrences,
                    },
                )
            })
            .collect();
        Self { results }
    }

    /// Whether a proof for `header` exists and holds
    pub fn holds(&self, header: &str) -> bool {
        self.results
            .get(&header.to_lowercase())
            .map(ProofResult::holds)
            .unwrap_or(false)
    }

    pub fn get(&self, header: &str) -> Option<&ProofResult> {
        self.results.get(&header.to_lowercase())
    }
}

/// Non-overlapping literal occurrences of `pattern` in `text`
pub fn count_occurrences(text: &str, pattern: &str) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    text.matches(pattern).count()
}
