//! Retry with exponential backoff
//!
//! Generic retry helper for transient failures (store timeouts, locked
//! database). Bulk reads go through [`read_or_empty`], which layers a
//! per-attempt timeout on top and degrades to an empty result once the
//! retry budget is spent.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::shared::types::DomainError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Execute an async operation with exponential backoff retry.
///
/// The `should_retry` closure determines whether a given error is transient
/// (and therefore retryable) or permanent (bail immediately).
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts,
                        error = %err,
                        "Operation failed permanently"
                    );
                    return Err(err);
                }

                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );

                tokio::time::sleep(delay).await;

                // Exponential backoff with cap
                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay.as_secs_f64()),
                );
                attempt += 1;
            }
        }
    }
}

/// Retry and timeout policy for bulk reads against the backing store.
///
/// Defaults: 2 retries after the first attempt, 1s then 2s backoff, and a
/// per-attempt timeout of `attempt_timeout * attempt` capped at
/// `timeout_ceiling`.
#[derive(Debug, Clone)]
pub struct BulkReadPolicy {
    pub retry: RetryConfig,
    pub attempt_timeout: Duration,
    pub timeout_ceiling: Duration,
}

impl BulkReadPolicy {
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.attempt_timeout
            .saturating_mul(attempt.max(1))
            .min(self.timeout_ceiling)
    }
}

impl Default for BulkReadPolicy {
    fn default() -> Self {
        Self {
            retry: RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_secs(1),
                backoff_multiplier: 2.0,
                max_delay: Duration::from_secs(2),
            },
            attempt_timeout: Duration::from_secs(5),
            timeout_ceiling: Duration::from_secs(15),
        }
    }
}

/// Timeouts applied by the application services to store calls.
#[derive(Debug, Clone)]
pub struct StorePolicy {
    /// Deadline for a single state-changing store call
    pub write_timeout: Duration,
    pub bulk: BulkReadPolicy,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_secs(10),
            bulk: BulkReadPolicy::default(),
        }
    }
}

/// Run a bulk read under [`BulkReadPolicy`].
///
/// Transient failures and per-attempt timeouts are retried; once the budget
/// is exhausted the read yields an empty list instead of an error. Permanent
/// errors also degrade to empty, since the data is read-only.
pub async fn read_or_empty<F, Fut, T>(
    policy: &BulkReadPolicy,
    mut operation: F,
    operation_name: &'static str,
) -> Vec<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<T>, DomainError>>,
{
    let mut attempt = 0u32;
    let result = retry_with_backoff(
        policy.retry.clone(),
        || {
            attempt += 1;
            let limit = policy.timeout_for(attempt);
            let read = operation();
            async move {
                match tokio::time::timeout(limit, read).await {
                    Ok(result) => result,
                    Err(_) => Err(DomainError::StoreTimeout(operation_name)),
                }
            }
        },
        DomainError::is_transient,
        operation_name,
    )
    .await;

    match result {
        Ok(items) => items,
        Err(e) => {
            warn!(
                operation = operation_name,
                error = %e,
                "Bulk read gave up, returning empty result"
            );
            Vec::new()
        }
    }
}

/// Bound a single store call by `limit`, surfacing [`DomainError::StoreTimeout`].
pub async fn with_deadline<T, Fut>(
    limit: Duration,
    operation_name: &'static str,
    operation: Fut,
) -> Result<T, DomainError>
where
    Fut: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = limit.as_millis() as u64,
                "Store call timed out"
            );
            Err(DomainError::StoreTimeout(operation_name))
        }
    }
}
