//! Service stack lifecycle
//!
//! Before checks run the stack is reused as is, restarted, or rebuilt through
//! `docker compose`. Commands go through a [`CommandRunner`] so the sequence
//! can be exercised without a container runtime. A failed command aborts the
//! remaining steps; nothing is retried.

mod readiness;

pub use readiness::*;

use clap::ValueEnum;
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

use contract_runner_core::report::ConsoleReport;

/// Stack lifecycle mode, chosen once per run
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StackMode {
    /// Stop, rebuild images in parallel, start without rebuilding
    #[default]
    Rebuild,
    /// Stop, then start
    Restart,
    /// Leave the running stack alone
    Reuse,
}

impl StackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackMode::Rebuild => "rebuild",
            StackMode::Restart => "restart",
            StackMode::Reuse => "reuse",
        }
    }
}

/// One compose invocation and the progress line printed before it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeStep {
    pub announce: &'static str,
    pub args: Vec<&'static str>,
}

impl ComposeStep {
    fn new(announce: &'static str, args: &[&'static str]) -> Self {
        Self {
            announce,
            args: args.to_vec(),
        }
    }
}

/// Compose project settings
#[derive(Debug, Clone)]
pub struct ComposeProject {
    /// Directory commands run in
    pub root: PathBuf,
    pub env_file: String,
    pub profile: String,
}

impl ComposeProject {
    pub const PROGRAM: &'static str = "docker";

    /// Arguments shared by every compose command
    pub fn base_args(&self) -> Vec<String> {
        vec![
            "compose".to_string(),
            "--env-file".to_string(),
            self.env_file.clone(),
            "--profile".to_string(),
            self.profile.clone(),
        ]
    }

    /// Compose steps for a lifecycle mode, in execution order
    pub fn plan(mode: StackMode) -> Vec<ComposeStep> {
        match mode {
            StackMode::Rebuild => vec![
                ComposeStep::new("stopping running containers", &["down"]),
                ComposeStep::new("rebuilding images in parallel", &["build", "--parallel"]),
                ComposeStep::new("starting stack", &["up", "-d", "--no-build"]),
            ],
            StackMode::Restart => vec![
                ComposeStep::new("stopping running containers", &["down"]),
                ComposeStep::new("starting stack", &["up", "-d"]),
            ],
            StackMode::Reuse => Vec::new(),
        }
    }

    /// Full argument list for one step
    pub fn command_args(&self, step: &ComposeStep) -> Vec<String> {
        let mut args = self.base_args();
        args.extend(step.args.iter().map(|a| a.to_string()));
        args
    }
}

/// Stack lifecycle errors
#[derive(Error, Debug)]
pub enum StackError {
    #[error("failed to run '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("command '{command}' failed with {status}")]
    Failed { command: String, status: String },

    #[error("failed to write stack progress: {0}")]
    Output(#[from] std::io::Error),
}

/// Executes external commands
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` in `cwd`; Ok only on a zero exit status
    fn run(
        &self,
        program: String,
        args: Vec<String>,
        cwd: PathBuf,
    ) -> Pin<Box<dyn Future<Output = Result<(), StackError>> + Send>>;
}

/// Runs commands as child processes, inheriting stdio
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: String,
        args: Vec<String>,
        cwd: PathBuf,
    ) -> Pin<Box<dyn Future<Output = Result<(), StackError>> + Send>> {
        Box::pin(async move {
            let command = format!("{} {}", program, args.join(" "));
            tracing::debug!(command = %command, cwd = %cwd.display(), "running command");

            let status = tokio::process::Command::new(&program)
                .args(&args)
                .current_dir(&cwd)
                .status()
                .await
                .map_err(|e| StackError::Spawn {
                    command: command.clone(),
                    message: e.to_string(),
                })?;

            if status.success() {
                Ok(())
            } else {
                Err(StackError::Failed {
                    command,
                    status: status.to_string(),
                })
            }
        })
    }
}

/// Applies a lifecycle mode to a compose project
pub struct StackLifecycle<R: CommandRunner> {
    project: ComposeProject,
    runner: R,
}

impl<R: CommandRunner> StackLifecycle<R> {
    pub fn new(project: ComposeProject, runner: R) -> Self {
        Self { project, runner }
    }

    /// Run the steps for `mode`, stopping at the first failure
    pub async fn apply<W: Write>(
        &self,
        mode: StackMode,
        report: &mut ConsoleReport<W>,
    ) -> Result<(), StackError> {
        report.stack(&format!("lifecycle mode: {}", mode.as_str()))?;
        if mode == StackMode::Reuse {
            report.stack("reusing existing stack (no compose down/build/up)")?;
            return Ok(());
        }

        for step in ComposeProject::plan(mode) {
            report.stack(step.announce)?;
            self.runner
                .run(
                    ComposeProject::PROGRAM.to_string(),
                    self.project.command_args(&step),
                    self.project.root.clone(),
                )
                .await?;
        }

        tracing::info!(mode = mode.as_str(), "stack lifecycle complete");
        Ok(())
    }
}
