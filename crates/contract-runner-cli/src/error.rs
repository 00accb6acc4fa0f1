//! Run error types
//!
//! Every failure of a run ends up as a [`RunError`]. Its kind decides the
//! verdict keyword and the process exit code, so CI can tell a broken
//! contract from a broken checker.

use thiserror::Error;

use contract_runner_core::client::FetchError;
use contract_runner_core::engine::EngineError;
use contract_runner_core::message::MessageError;
use contract_runner_core::report::RunStatus;
use contract_runner_core::ContractSetError;

use crate::stack::{ReadinessError, StackError};

/// Top-level run error
#[derive(Error, Debug)]
pub enum RunError {
    /// One or more contract checks did not hold
    #[error("{0}")]
    Contract(String),

    /// Documents unavailable, stack not ready, lifecycle command or artifact read failed
    #[error("{0}")]
    Infrastructure(String),

    /// The checker itself failed
    #[error("{0}")]
    Internal(String),
}

impl RunError {
    pub fn internal(msg: impl Into<String>) -> Self {
        RunError::Internal(msg.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Contract(_) | RunError::Infrastructure(_) => 1,
            RunError::Internal(_) => 2,
        }
    }

    /// Verdict keyword for the final console line
    pub fn status(&self) -> RunStatus {
        match self {
            RunError::Contract(_) | RunError::Infrastructure(_) => RunStatus::Fail,
            RunError::Internal(_) => RunStatus::Error,
        }
    }
}

impl From<FetchError> for RunError {
    fn from(err: FetchError) -> Self {
        match err.url() {
            Some(url) => RunError::Infrastructure(format!("failed to load {}: {}", url, err)),
            None => RunError::Internal(err.to_string()),
        }
    }
}

impl From<StackError> for RunError {
    fn from(err: StackError) -> Self {
        RunError::Infrastructure(err.to_string())
    }
}

impl From<ReadinessError> for RunError {
    fn from(err: ReadinessError) -> Self {
        RunError::Infrastructure(err.to_string())
    }
}

impl From<MessageError> for RunError {
    fn from(err: MessageError) -> Self {
        match err {
            MessageError::Artifact { .. } => RunError::Infrastructure(err.to_string()),
            MessageError::Anchor { .. } => RunError::Internal(err.to_string()),
        }
    }
}

impl From<EngineError> for RunError {
    fn from(err: EngineError) -> Self {
        RunError::Internal(err.to_string())
    }
}

impl From<ContractSetError> for RunError {
    fn from(err: ContractSetError) -> Self {
        RunError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for RunError {
    fn from(err: std::io::Error) -> Self {
        RunError::Internal(format!("failed to write report: {}", err))
    }
}
