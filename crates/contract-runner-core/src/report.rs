//! Run reports
//!
//! [`ConsoleReport`] writes the line-oriented console format that CI logs and
//! humans read. The format is stable: one line per requirement header, check
//! and violation detail, followed by a summary and the final verdict.
//! [`RunReport`] is the machine-readable form of the same run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use uuid::Uuid;

use crate::contracts::{ApiOutcome, QueueOutcome, Violation};
use crate::proof::SourceProofs;
use crate::schema::InterfaceDocument;

/// Final run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pass,
    Fail,
    Error,
}

impl RunStatus {
    pub fn keyword(&self) -> &'static str {
        match self {
            RunStatus::Pass => "PASS",
            RunStatus::Fail => "FAIL",
            RunStatus::Error => "ERROR",
        }
    }
}

/// Violation summary for the final verdict, API section first
pub fn violation_summary(api: &[Violation], queue: &[Violation]) -> String {
    let mut sections = Vec::new();
    if !api.is_empty() {
        let lines: Vec<String> = api.iter().map(|v| v.to_string()).collect();
        sections.push(format!(
            "API contract violations detected:\n - {}",
            lines.join("\n - ")
        ));
    }
    if !queue.is_empty() {
        let lines: Vec<&str> = queue.iter().map(|v| v.message.as_str()).collect();
        sections.push(format!(
            "Queue contract violations detected:\n - {}",
            lines.join("\n - ")
        ));
    }
    sections.join("\n")
}

/// Console report writer
pub struct ConsoleReport<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Stack lifecycle or readiness progress line
    pub fn stack(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "[stack] {}", message)
    }

    pub fn api_loading(&mut self) -> io::Result<()> {
        writeln!(self.out, "[api] loading provider OpenAPI specs")
    }

    pub fn document_loaded(&mut self, document: &InterfaceDocument) -> io::Result<()> {
        writeln!(self.out, "[api] {}: loaded {}", document.provider, document.url)
    }

    /// Requirement blocks followed by the API summary
    pub fn api_outcome(&mut self, outcome: &ApiOutcome) -> io::Result<()> {
        for entry in &outcome.ambiguous_templates {
            writeln!(self.out, "[api] warning: ambiguous path templates {}", entry)?;
        }

        for result in &outcome.requirements {
            let label = result.requirement.label();
            if result.is_missing_operation() {
                writeln!(self.out, "{} :: FAIL", label)?;
                writeln!(self.out, "  - operation exists: FAIL")?;
                writeln!(self.out, "    * missing operation")?;
                continue;
            }

            writeln!(self.out, "{} :: checking", label)?;
            for check in &result.checks {
                writeln!(self.out, "  - {}: {}", check.check, check.status.keyword())?;
                for error in check.status.errors() {
                    writeln!(self.out, "    * {}", error)?;
                }
            }
            let verdict = if result.passed() { "PASS" } else { "FAIL" };
            writeln!(self.out, "{} :: {}", label, verdict)?;
        }

        writeln!(
            self.out,
            "[api] {}/{} contracts passed",
            outcome.passed_count(),
            outcome.total()
        )?;
        if outcome.is_success() {
            writeln!(self.out, "[api] all consumer/provider checks passed")?;
        }
        Ok(())
    }

    /// Queue check lines followed by the queue summary
    pub fn queue_outcome(&mut self, outcome: &QueueOutcome) -> io::Result<()> {
        writeln!(
            self.out,
            "[queue] validating {} -> {} {} payload contract",
            outcome.producer, outcome.consumer, outcome.contract
        )?;
        for check in &outcome.checks {
            if check.passed {
                writeln!(self.out, "[queue] {}: PASS", check.label)?;
            } else {
                writeln!(self.out, "[queue] {}: FAIL", check.label)?;
                if let Some(detail) = &check.detail {
                    writeln!(self.out, "  * {}", detail)?;
                }
            }
        }

        writeln!(
            self.out,
            "[queue] {}/{} checks passed",
            outcome.passed_count(),
            outcome.total()
        )?;
        if outcome.is_success() {
            writeln!(self.out, "[queue] queue payload contract checks passed")?;
        }
        Ok(())
    }

    /// Final verdict; `detail` follows on the next lines for FAIL and ERROR
    pub fn verdict(&mut self, status: RunStatus, detail: Option<&str>) -> io::Result<()> {
        match detail {
            Some(detail) if status != RunStatus::Pass => {
                writeln!(self.out, "contract runner: {}\n{}", status.keyword(), detail)
            }
            _ => writeln!(self.out, "contract runner: {}", status.keyword()),
        }?;
        self.out.flush()
    }
}

/// Fetched document metadata
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub provider: String,
    pub url: String,
    pub sha256: String,
}

impl From<&InterfaceDocument> for DocumentSummary {
    fn from(document: &InterfaceDocument) -> Self {
        Self {
            provider: document.provider.clone(),
            url: document.url.clone(),
            sha256: document.digest.clone(),
        }
    }
}

/// Machine-readable run report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub documents: Vec<DocumentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiOutcome>,
    pub queues: Vec<QueueOutcome>,
    pub proofs: SourceProofs,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    /// Start a report for a run in `mode`
    pub fn start(mode: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode: mode.into(),
            started_at: Utc::now(),
            finished_at: None,
            status: RunStatus::Pass,
            documents: Vec::new(),
            api: None,
            queues: Vec::new(),
            proofs: SourceProofs::none(),
            violations: Vec::new(),
            error: None,
        }
    }

    pub fn record_documents<'a>(&mut self, documents: impl IntoIterator<Item = &'a InterfaceDocument>) {
        self.documents.extend(documents.into_iter().map(DocumentSummary::from));
    }

    /// Record a run-aborting error; it decides the final status
    pub fn record_error(&mut self, status: RunStatus, message: impl Into<String>) {
        self.status = status;
        self.error = Some(message.into());
    }

    /// Stamp the finish time and collect violations
    ///
    /// Without a recorded error the status follows from the violations.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        self.violations = self
            .api
            .iter()
            .flat_map(ApiOutcome::violations)
            .chain(self.queues.iter().flat_map(QueueOutcome::violations))
            .collect();

        if self.error.is_none() {
            self.status = if self.violations.is_empty() {
                RunStatus::Pass
            } else {
                RunStatus::Fail
            };
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
