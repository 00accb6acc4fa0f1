//! CLI module for the contract runner
//!
//! Parses arguments, drives one [`Runner`](crate::runner::Runner) with the
//! system command runner, prints the verdict and maps the outcome to an
//! exit code.

pub mod commands;
pub mod output;

pub use commands::{CheckMode, RunnerCli};
pub use output::OutputFormat;

use std::io;

use contract_runner_core::report::{ConsoleReport, RunReport, RunStatus};

use crate::error::RunError;
use crate::runner::{RunConfig, Runner};
use crate::stack::SystemRunner;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every contract check passed
    Success = 0,
    /// Contract violations, or the stack/documents were unavailable
    ContractViolation = 1,
    /// The runner itself failed
    InternalError = 2,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a run result
    pub fn from_result(result: &Result<(), RunError>) -> Self {
        match result {
            Ok(()) => ExitCode::Success,
            Err(e) if e.exit_code() == 1 => ExitCode::ContractViolation,
            Err(_) => ExitCode::InternalError,
        }
    }
}

/// Run the CLI and return the exit code
///
/// Errors only when the verdict or report cannot be written.
pub async fn run(cli: RunnerCli) -> Result<ExitCode, RunError> {
    let format = cli.format;
    let mut console = ConsoleReport::new(format.progress_stream());
    let mut report = RunReport::start(cli.mode.as_str());

    let result = match RunConfig::from_cli(&cli) {
        Ok(config) => {
            let runner = Runner::new(config, SystemRunner);
            runner.run(&mut console, &mut report).await
        }
        Err(e) => Err(e),
    };

    match &result {
        Ok(()) => console.verdict(RunStatus::Pass, None)?,
        Err(e) => {
            if !matches!(e, RunError::Contract(_)) {
                report.record_error(e.status(), e.to_string());
            }
            console.verdict(e.status(), Some(&e.to_string()))?;
        }
    }
    report.finish();

    if format == OutputFormat::Json {
        output::write_json_report(&report, &mut io::stdout())?;
    }

    Ok(ExitCode::from_result(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::ContractViolation), 1);
        assert_eq!(i32::from(ExitCode::InternalError), 2);
    }

    #[test]
    fn test_exit_code_from_result() {
        assert_eq!(ExitCode::from_result(&Ok(())), ExitCode::Success);
        assert_eq!(
            ExitCode::from_result(&Err(RunError::Contract("x".to_string()))),
            ExitCode::ContractViolation
        );
        assert_eq!(
            ExitCode::from_result(&Err(RunError::Infrastructure("x".to_string()))),
            ExitCode::ContractViolation
        );
        assert_eq!(
            ExitCode::from_result(&Err(RunError::internal("x"))),
            ExitCode::InternalError
        );
    }
}
