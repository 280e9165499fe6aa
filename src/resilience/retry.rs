//! Bounded retry around asynchronous operations.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::resilience::backoff::{delay_for_attempt, BackoffKind};

/// Retry bounds and delay shape for one call.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of invocations, including the first (>= 1).
    pub max_attempts: u32,

    /// Base delay fed into the backoff computation, in milliseconds.
    pub base_delay_ms: u64,

    /// Delay growth per attempt.
    pub backoff: BackoffKind,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            backoff: BackoffKind::Exponential,
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping between attempts.
///
/// Attempts are strictly sequential; the wait suspends the task without
/// blocking the runtime. The last error is returned unchanged. Retries are
/// unconditional: callers decide beforehand which failures are worth
/// feeding into this loop.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(error);
                }
                let delay = delay_for_attempt(policy.backoff, policy.base_delay_ms, attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "operation failed, backing off"
                );
                metrics::record_retry();
                tokio::time::sleep(delay).await;
            }
        }
    }
}
