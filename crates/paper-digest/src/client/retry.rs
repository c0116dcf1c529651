//! Fixed-delay retry loop shared by every upstream client.

use std::future::Future;

use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::error::{ClientError, ClientResult};

/// Outcome of a retried operation that did not succeed.
#[derive(Debug)]
pub struct RetryFailure {
    /// The last error observed.
    pub error: ClientError,

    /// Attempts made before giving up.
    pub attempts: u32,
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is spent.
///
/// The closure receives the 1-based attempt number. Consecutive attempts are
/// separated by exactly `policy.delay` of non-blocking sleep.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, RetryFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if !error.is_retryable() => {
                debug!(operation = operation_name, attempt, %error, "non-retryable failure");
                return Err(RetryFailure { error, attempts: attempt });
            }
            Err(error) if attempt >= max_attempts => {
                warn!(operation = operation_name, attempts = attempt, %error, "retries exhausted");
                return Err(RetryFailure { error, attempts: attempt });
            }
            Err(error) => {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    delay = ?policy.delay,
                    %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
