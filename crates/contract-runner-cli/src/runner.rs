//! Run orchestration
//!
//! One run: apply the stack lifecycle, wait for provider documents (API
//! modes), evaluate API requirements and queue contracts, then fold every
//! violation into a single outcome. Infrastructure failures abort the run
//! where they happen; contract violations are collected across both check
//! families before the run fails.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use contract_runner_core::client::SchemaClient;
use contract_runner_core::engine::VerificationEngine;
use contract_runner_core::message;
use contract_runner_core::proof::SourceProofs;
use contract_runner_core::report::{violation_summary, ConsoleReport, RunReport};
use contract_runner_core::schema::InterfaceDocument;
use contract_runner_core::ContractSet;

use crate::cli::{CheckMode, RunnerCli};
use crate::error::RunError;
use crate::stack::{
    wait_until_ready, CommandRunner, ComposeProject, ReadinessPolicy, StackLifecycle, StackMode,
};

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: CheckMode,
    pub stack_mode: StackMode,
    pub base_url: String,
    pub fetch_timeout_secs: u64,
    pub readiness: ReadinessPolicy,
    pub project: ComposeProject,
    pub contracts: ContractSet,
}

impl RunConfig {
    /// Resolve the CLI arguments and load the contract set
    pub fn from_cli(cli: &RunnerCli) -> Result<Self, RunError> {
        let contracts = match &cli.contracts {
            Some(path) => ContractSet::from_path(path)?,
            None => ContractSet::builtin()?,
        };
        tracing::info!(
            providers = contracts.providers.len(),
            requirements = contracts.requirements.len(),
            queues = contracts.queues.len(),
            "contract set loaded"
        );

        Ok(Self {
            mode: cli.mode,
            stack_mode: cli.effective_stack_mode(),
            base_url: cli.base_url.clone(),
            fetch_timeout_secs: cli.timeout,
            readiness: ReadinessPolicy::new(cli.poll_interval(), cli.wait_timeout()),
            project: ComposeProject {
                root: cli.root.clone(),
                env_file: cli.env_file.clone(),
                profile: cli.compose_profile.clone(),
            },
            contracts,
        })
    }

    /// Project root artifacts are resolved against
    pub fn root(&self) -> &PathBuf {
        &self.project.root
    }

    /// Document URLs of every provider, in declaration order
    pub fn document_urls(&self) -> Vec<String> {
        self.contracts
            .providers
            .iter()
            .map(|p| p.document_url(&self.base_url))
            .collect()
    }
}

/// Contract run orchestrator
pub struct Runner<R: CommandRunner> {
    config: RunConfig,
    lifecycle: StackLifecycle<R>,
}

impl<R: CommandRunner> Runner<R> {
    pub fn new(config: RunConfig, runner: R) -> Self {
        let lifecycle = StackLifecycle::new(config.project.clone(), runner);
        Self { config, lifecycle }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute the run, streaming the console report to `console` and
    /// recording results in `report`
    pub async fn run<W: Write>(
        &self,
        console: &mut ConsoleReport<W>,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        self.lifecycle.apply(self.config.stack_mode, console).await?;

        if self.config.mode.runs_api() {
            let client = SchemaClient::new(self.config.fetch_timeout_secs)?;
            console.stack("waiting for OpenAPI endpoints")?;
            wait_until_ready(&client, &self.config.document_urls(), &self.config.readiness).await?;
            console.stack("OpenAPI endpoints are ready")?;

            self.run_api_checks(&client, console, report).await?;
        }

        if self.config.mode.runs_queue() {
            self.run_queue_checks(console, report)?;
        }

        let api_violations = report
            .api
            .as_ref()
            .map(|outcome| outcome.violations())
            .unwrap_or_default();
        let queue_violations: Vec<_> = report.queues.iter().flat_map(|q| q.violations()).collect();

        if api_violations.is_empty() && queue_violations.is_empty() {
            Ok(())
        } else {
            Err(RunError::Contract(violation_summary(
                &api_violations,
                &queue_violations,
            )))
        }
    }

    async fn run_api_checks<W: Write>(
        &self,
        client: &SchemaClient,
        console: &mut ConsoleReport<W>,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        console.api_loading()?;

        let mut documents: BTreeMap<String, InterfaceDocument> = BTreeMap::new();
        for provider in &self.config.contracts.providers {
            let document = client.fetch_provider(provider, &self.config.base_url).await?;
            console.document_loaded(&document)?;
            documents.insert(provider.name.clone(), document);
        }
        report.record_documents(documents.values());

        let proofs = SourceProofs::evaluate(&self.config.contracts.header_proofs, self.config.root());
        let engine = VerificationEngine::new(proofs.clone());
        let outcome = engine.evaluate(&self.config.contracts.requirements, &documents)?;

        console.api_outcome(&outcome)?;
        tracing::info!(
            passed = outcome.passed_count(),
            total = outcome.total(),
            "API contract checks complete"
        );

        report.proofs = proofs;
        report.api = Some(outcome);
        Ok(())
    }

    fn run_queue_checks<W: Write>(
        &self,
        console: &mut ConsoleReport<W>,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        for spec in &self.config.contracts.queues {
            let outcome = message::check_files(spec, self.config.root())?;
            console.queue_outcome(&outcome)?;
            tracing::info!(
                contract = %spec.name,
                passed = outcome.passed_count(),
                total = outcome.total(),
                "queue contract checks complete"
            );
            report.queues.push(outcome);
        }
        Ok(())
    }
}
