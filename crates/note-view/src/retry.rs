//! Reload with exponential backoff.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::RefreshError;
use crate::loader::DocumentLoader;
use crate::models::Document;

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Growth factor per retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits, for tests and synchronous hosts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.max(1.0).powi(retry.saturating_sub(1) as i32);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Call `loader` until it succeeds, a permanent error occurs, or attempts run out.
pub async fn load_with_retry(
    loader: &dyn DocumentLoader,
    policy: &RetryPolicy,
) -> Result<Vec<Document>, RefreshError> {
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        debug!(attempt, max_attempts, "loading documents");

        match loader.load_all().await {
            Ok(documents) => {
                if attempt > 1 {
                    info!(attempt, "document load succeeded after retry");
                }
                return Ok(documents);
            }
            Err(source) if !source.is_retryable() => {
                warn!(attempt, error = %source, "document load failed permanently");
                return Err(RefreshError::Permanent {
                    attempts: attempt,
                    source,
                });
            }
            Err(source) if attempt >= max_attempts => {
                return Err(RefreshError::Exhausted {
                    attempts: attempt,
                    source,
                });
            }
            Err(source) => {
                let delay = policy.delay_for(attempt);
                warn!(attempt, ?delay, error = %source, "document load failed, retrying");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}
