use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::sleep;

use crate::error::ImportError;

/// An explicit retry budget: how many times to attempt an operation and how
/// long to sleep between attempts. The delay is fixed, not backed off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` up to `max_attempts` times, sleeping `delay` between
    /// attempts. An error for which `is_retryable` returns false propagates
    /// immediately; otherwise the last error is returned once the budget is
    /// exhausted.
    pub async fn run<T, F, Fut, P>(
        &self,
        label: &str,
        is_retryable: P,
        mut operation: F,
    ) -> Result<T, ImportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ImportError>>,
        P: Fn(&ImportError) -> bool,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            debug!("{} (attempt {}/{})", label, attempt, self.max_attempts);

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => {
                    warn!(
                        "{} failed (attempt {}/{}): {}",
                        label, attempt, self.max_attempts, e
                    );
                    last_error = Some(e);

                    if attempt < self.max_attempts && !self.delay.is_zero() {
                        debug!("Waiting {:?} before retry", self.delay);
                        sleep(self.delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        // max_attempts >= 1, so at least one attempt ran and left an error
        Err(last_error.unwrap_or_else(|| ImportError::FatalFetch(format!("{} never ran", label))))
    }
}
