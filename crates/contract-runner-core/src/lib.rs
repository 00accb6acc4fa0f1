//! Contract Runner Core
//!
//! Verifies that services agree on their interfaces before they are deployed
//! together. Consumer requirements (operations, headers, request and response
//! fields, security schemes, error envelopes) are checked against the OpenAPI
//! documents providers publish, and queue message contracts are checked
//! statically against producer source and documentation.
//!
//! # Example
//!
//! ```rust,ignore
//! use contract_runner_core::{client::SchemaClient, engine::VerificationEngine, ContractSet};
//!
//! let set = ContractSet::builtin()?;
//! let client = SchemaClient::new(10)?;
//! let document = client.fetch_provider(&set.providers[0], "http://localhost").await?;
//! let outcome = VerificationEngine::default().evaluate_requirement(&set.requirements[0], &document);
//! ```

pub mod client;
pub mod engine;
pub mod error;
pub mod message;
pub mod proof;
pub mod report;
pub mod schema;

#[path = "../contracts/mod.rs"]
pub mod contracts;

pub use contracts::*;
pub use error::{ContractSetError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
