use std::future::Future;
use std::time::Duration;

use crate::error::AnalysisError;

/// Bounded retry with exponential backoff around a whole analysis
///
/// Only transient failures (`is_retryable`) are retried; input errors,
/// 4xx replies and bad upstream data return immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// How long idle connections are kept before being reclaimed
    pub idle_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Policy that runs the operation exactly once
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AnalysisError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnalysisError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        "Attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            idle_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_backoff_growth() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(400));
        assert_eq!(policy.backoff(3), Duration::from_millis(800));
        assert_eq!(policy.backoff(20), Duration::from_secs(5));
    }

    #[test]
    fn test_retries_transient_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = tokio_test::block_on(fast_policy(3).run(move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(AnalysisError::UpstreamUnavailable {
                    message: "timeout".into(),
                    transient: true,
                })
            } else {
                Ok(n)
            }
        }));

        assert_eq!(result.unwrap(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = tokio_test::block_on(fast_policy(2).run(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::ScoringFailed {
                message: "oom".into(),
                transient: true,
            })
        }));

        assert!(matches!(result, Err(AnalysisError::ScoringFailed { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_does_not_retry_client_errors() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = tokio_test::block_on(fast_policy(5).run(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::PositionOutOfWindow { position: 10, start: 1, end: 5 })
        }));

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_does_not_retry_deterministic_scoring_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), _> = tokio_test::block_on(fast_policy(5).run(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AnalysisError::scoring_failed("expected 1 scores, got 2"))
        }));

        assert!(matches!(result, Err(AnalysisError::ScoringFailed { .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
