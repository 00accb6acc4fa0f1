//! Contract Runner
//!
//! Command-line front end for `contract-runner-core`. A run brings the
//! docker compose stack into a known state, waits until every provider
//! serves its OpenAPI document, verifies the consumer/provider API contracts
//! and the queue payload contracts, and exits with a single verdict.
//!
//! ## Architecture
//!
//! 1. **CLI** (`cli/`): argument parsing, output format, exit codes.
//! 2. **Stack** (`stack/`): compose lifecycle and the readiness wait.
//! 3. **Runner** (`runner`): orchestration of one run.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Rebuild the stack and run every check
//! contract-runner
//!
//! # Reuse a running stack, API checks only
//! contract-runner --mode api --stack-mode reuse --base-url http://localhost:8080
//!
//! # Queue payload checks only, machine-readable report
//! contract-runner --mode queue --stack-mode reuse --format json
//! ```

pub mod cli;
pub mod error;
pub mod runner;
pub mod stack;

pub use cli::{CheckMode, ExitCode, OutputFormat, RunnerCli};
pub use error::RunError;
pub use runner::{RunConfig, Runner};

/// Run the CLI and return the process exit code
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use contract_runner_cli::{run_cli, RunnerCli};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let cli = RunnerCli::parse();
///     let exit_code = run_cli(cli).await;
///     std::process::exit(exit_code.into());
/// }
/// ```
pub async fn run_cli(cli: RunnerCli) -> ExitCode {
    match cli::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::InternalError
        }
    }
}
