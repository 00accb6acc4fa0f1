//! Contract Runner CLI
//!
//! # Usage
//!
//! ```bash
//! contract-runner --mode all --stack-mode rebuild
//! contract-runner --mode api --stack-mode reuse --timeout 5
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - every contract check passed
//! - 1: Contract violations detected, or the stack/documents were unavailable
//! - 2: Internal error

use anyhow::Context;
use clap::Parser;
use contract_runner_cli::{run_cli, RunnerCli};

fn main() -> anyhow::Result<()> {
    let cli = RunnerCli::parse();

    // Logs go to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(cli.log_level().into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let exit_code = runtime.block_on(run_cli(cli));
    std::process::exit(exit_code.into());
}
