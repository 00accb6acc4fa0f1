//! Readiness wait
//!
//! Polls provider document URLs until each has been fetched once or the
//! deadline passes.

use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use contract_runner_core::client::SchemaClient;

/// Default delay between polling rounds
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Polling interval and overall deadline
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl ReadinessPolicy {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

#[derive(Error, Debug)]
pub enum ReadinessError {
    #[error("stack did not become ready before timeout; missing:\n - {}", .missing.join("\n - "))]
    NotReady {
        /// URLs that never returned a document, sorted
        missing: Vec<String>,
    },
}

/// Wait until every URL serves a well-formed document
///
/// Each round fetches every pending URL once; fetch failures only keep the
/// URL pending.
pub async fn wait_until_ready(
    client: &SchemaClient,
    urls: &[String],
    policy: &ReadinessPolicy,
) -> Result<(), ReadinessError> {
    let deadline = Instant::now() + policy.timeout;
    let mut remaining: BTreeSet<String> = urls.iter().cloned().collect();
    let mut round = 0u32;

    while !remaining.is_empty() && Instant::now() < deadline {
        round += 1;
        let pending: Vec<String> = remaining.iter().cloned().collect();
        for url in pending {
            match client.fetch(&url).await {
                Ok(_) => {
                    tracing::debug!(url = %url, round, "endpoint ready");
                    remaining.remove(&url);
                }
                Err(e) => tracing::debug!(url = %url, round, error = %e, "endpoint not ready"),
            }
        }

        if !remaining.is_empty() {
            let left = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(policy.interval.min(left)).await;
        }
    }

    if remaining.is_empty() {
        Ok(())
    } else {
        Err(ReadinessError::NotReady {
            missing: remaining.into_iter().collect(),
        })
    }
}
