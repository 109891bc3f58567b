//! Retry utilities for resilient operations
//!
//! A bounded retry loop with configurable back-off, used by adapters whose
//! upstream is flaky enough to warrant a second attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first one
    pub max_retries: u32,

    /// Base delay in milliseconds between attempts
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,

    /// Multiplier applied to the delay after each retry (1.0 = fixed delay)
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Total attempts with a constant pause between them
    ///
    /// `attempts` counts the first try, so `fixed(2, 1000)` means one retry
    /// after a one second sleep.
    pub fn fixed(attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_retries: attempts.saturating_sub(1),
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            backoff_multiplier: 1.0,
        }
    }

    /// Calculate delay for a given attempt
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = if attempt == 0 {
            0
        } else {
            let exponential =
                self.base_delay_ms as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
            (exponential as u64).min(self.max_delay_ms)
        };

        Duration::from_millis(delay_ms)
    }
}

/// Execute an operation with retry logic, using a custom retry predicate
///
/// Returns the first success, or the last error once all attempts are spent.
/// Errors rejected by `should_retry` are returned immediately.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation: F,
    should_retry: P,
) -> Result<T, E>
where
    E: Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = config.calculate_delay(attempt);
            debug!(
                attempt = attempt,
                delay_ms = delay.as_millis(),
                "Retrying operation after delay"
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                if !should_retry(&e) {
                    warn!(error = %e, "Non-retryable error encountered");
                    return Err(e);
                }

                warn!(
                    attempt = attempt,
                    max_retries = config.max_retries,
                    error = %e,
                    "Operation failed"
                );

                if attempt >= config.max_retries {
                    return Err(e);
                }
            }
        }

        attempt += 1;
    }
}
