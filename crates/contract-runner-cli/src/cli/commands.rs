//! CLI argument definitions for the contract runner

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

use super::output::OutputFormat;
use crate::stack::StackMode;

/// Which contract checks to run
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// API and queue checks
    #[default]
    All,
    /// Consumer/provider API checks only
    Api,
    /// Queue payload checks only
    Queue,
}

impl CheckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckMode::All => "all",
            CheckMode::Api => "api",
            CheckMode::Queue => "queue",
        }
    }

    pub fn runs_api(&self) -> bool {
        matches!(self, CheckMode::All | CheckMode::Api)
    }

    pub fn runs_queue(&self) -> bool {
        matches!(self, CheckMode::All | CheckMode::Queue)
    }
}

/// Contract Runner CLI
///
/// Brings the service stack into a known state, waits for provider OpenAPI
/// documents, then verifies consumer/provider API contracts and queue payload
/// contracts.
#[derive(Parser, Debug)]
#[command(name = "contract-runner")]
#[command(about = "Verify consumer/provider API and queue payload contracts", long_about = None)]
#[command(version)]
pub struct RunnerCli {
    /// Which contract checks to run
    #[arg(long, value_enum, default_value = "all", env = "CONTRACT_RUNNER_MODE")]
    pub mode: CheckMode,

    /// Base URL for provider OpenAPI endpoints
    #[arg(long, default_value = "http://localhost", env = "CONTRACT_RUNNER_BASE_URL")]
    pub base_url: String,

    /// HTTP timeout seconds for OpenAPI fetches
    #[arg(long, default_value_t = 10, env = "CONTRACT_RUNNER_TIMEOUT")]
    pub timeout: u64,

    /// Stack readiness timeout in seconds
    #[arg(long, default_value_t = 180, env = "CONTRACT_RUNNER_WAIT_TIMEOUT")]
    pub wait_timeout: u64,

    /// Delay between readiness polls in milliseconds
    #[arg(long, default_value_t = 1000, env = "CONTRACT_RUNNER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Compose env file path
    #[arg(long, default_value = ".env")]
    pub env_file: String,

    /// Compose profile used to start services
    #[arg(long, default_value = "app")]
    pub compose_profile: String,

    /// Stack lifecycle mode before running contract checks
    #[arg(long, value_enum, default_value = "rebuild", env = "CONTRACT_RUNNER_STACK_MODE")]
    pub stack_mode: StackMode,

    /// Deprecated alias for --stack-mode reuse
    #[arg(long)]
    pub skip_stack: bool,

    /// Project root; compose runs here and artifacts resolve against it
    #[arg(long, default_value = ".", env = "CONTRACT_RUNNER_ROOT")]
    pub root: PathBuf,

    /// Contract set file (YAML, JSON or TOML); the built-in set when omitted
    #[arg(long, env = "CONTRACT_RUNNER_CONTRACTS")]
    pub contracts: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl RunnerCli {
    /// Lifecycle mode after applying the deprecated `--skip-stack` alias
    pub fn effective_stack_mode(&self) -> StackMode {
        if self.skip_stack {
            tracing::warn!("--skip-stack is deprecated; use --stack-mode reuse");
            StackMode::Reuse
        } else {
            self.stack_mode
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout)
    }

    /// Default log level for the verbosity count
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
