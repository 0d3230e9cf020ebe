//! Per-account fan-out for the nightly analysis run.
//!
//! Every account runs as an independent tokio task; a semaphore bounds how
//! many run at once. One account failing (or panicking) never affects the
//! others, and each outcome is recorded on its own.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOutcome<T> {
    pub account_id: String,
    pub status: AccountStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport<T> {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Sorted by account id.
    pub outcomes: Vec<AccountOutcome<T>>,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run `job` once per account with at most `concurrency` jobs in flight.
///
/// Accounts complete in no particular order; the report lists them sorted
/// by account id. `concurrency` of 0 is treated as 1.
pub async fn run_account_batch<F, Fut, T, E>(
    account_ids: Vec<String>,
    concurrency: usize,
    job: F,
) -> BatchReport<T>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Display + Send + 'static,
{
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    let concurrency = concurrency.max(1);
    info!(%run_id, accounts = account_ids.len(), concurrency, "account batch started");

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let job = Arc::new(job);
    let mut set = JoinSet::new();

    for account_id in account_ids {
        let semaphore = Arc::clone(&semaphore);
        let job = Arc::clone(&job);
        set.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => return failure(account_id, format!("concurrency limiter closed: {e}"), 0),
            };

            let start = Instant::now();
            // Separate task so a panicking job surfaces as a JoinError here.
            let result = tokio::spawn(job(account_id.clone())).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(Ok(output)) => {
                    debug!(account_id = %account_id, elapsed_ms, "account completed");
                    AccountOutcome {
                        account_id,
                        status: AccountStatus::Succeeded,
                        output: Some(output),
                        error: None,
                        elapsed_ms,
                    }
                }
                Ok(Err(e)) => failure(account_id, e.to_string(), elapsed_ms),
                Err(join_err) if join_err.is_panic() => {
                    failure(account_id, "job panicked".to_string(), elapsed_ms)
                }
                Err(join_err) => failure(account_id, join_err.to_string(), elapsed_ms),
            }
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(outcome) => {
                if let Some(err) = &outcome.error {
                    warn!(%run_id, account_id = %outcome.account_id, error = %err, "account failed");
                }
                outcomes.push(outcome);
            }
            Err(e) => error!(%run_id, error = %e, "account task aborted"),
        }
    }

    outcomes.sort_by(|a, b| a.account_id.cmp(&b.account_id));
    let succeeded = outcomes
        .iter()
        .filter(|o| o.status == AccountStatus::Succeeded)
        .count();
    let failed = outcomes.len() - succeeded;
    let finished_at = Utc::now();

    info!(
        %run_id,
        succeeded,
        failed,
        elapsed_ms = (finished_at - started_at).num_milliseconds(),
        "account batch finished"
    );

    BatchReport {
        run_id,
        started_at,
        finished_at,
        outcomes,
        succeeded,
        failed,
    }
}

fn failure<T>(account_id: String, error: String, elapsed_ms: u64) -> AccountOutcome<T> {
    AccountOutcome {
        account_id,
        status: AccountStatus::Failed,
        output: None,
        error: Some(error),
        elapsed_ms,
    }
}
