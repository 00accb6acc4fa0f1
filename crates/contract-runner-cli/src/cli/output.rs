//! Report output formats
//!
//! `text` streams the stable console report to stdout. `json` moves progress
//! lines to stderr and prints a single [`RunReport`] document on stdout.

use clap::ValueEnum;
use std::io::{self, Write};

use contract_runner_core::report::RunReport;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Line-oriented console report
    #[default]
    Text,
    /// JSON run report for machine processing
    Json,
}

impl OutputFormat {
    /// Stream that receives console progress lines
    pub fn progress_stream(&self) -> Box<dyn Write> {
        match self {
            OutputFormat::Text => Box::new(io::stdout()),
            OutputFormat::Json => Box::new(io::stderr()),
        }
    }
}

/// Write the JSON report to `out`
pub fn write_json_report<W: Write>(report: &RunReport, out: &mut W) -> io::Result<()> {
    let json = report
        .to_json()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    writeln!(out, "{}", json)?;
    out.flush()
}
