//! Fixed cool-down retry for rate-limited trends requests.
//!
//! The trends upstream answers 429 when it wants callers to back off for a
//! while, so the wait does not grow between attempts. Anything other than
//! [`TrendsError::RateLimited`] is returned on the attempt that produced it.

use std::future::Future;
use std::time::Duration;

use trendscope_core::{AppConfig, NoticeLevel, Notifier};

use crate::error::TrendsError;

/// Shown to the user before each wait.
pub const RETRY_NOTICE: &str = "Rate limit reached, retrying...";

/// How many times to try and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            cooldown: Duration::from_secs(config.rate_limit_cooldown_secs),
        }
    }

    /// Longest a fetch can spend waiting when every attempt is rate limited.
    #[must_use]
    pub fn worst_case_wait(&self) -> Duration {
        self.cooldown
            .saturating_mul(self.max_attempts.max(1).saturating_sub(1))
    }
}

/// Runs `operation` until it succeeds, fails with a non-rate-limit error, or
/// `policy.max_attempts` attempts have been made.
///
/// Before every retry a [`RETRY_NOTICE`] warning is sent to `notifier` and the
/// task sleeps for `policy.cooldown`. Nothing is sent or awaited after the
/// last attempt, so an exhausted run of `n` attempts emits `n - 1` notices.
pub(crate) async fn retry_on_rate_limit<T, F, Fut>(
    policy: RetryPolicy,
    notifier: &dyn Notifier,
    mut operation: F,
) -> Result<T, TrendsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TrendsError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_rate_limited() || attempt >= max_attempts {
                    return Err(err);
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    cooldown_secs = policy.cooldown.as_secs(),
                    error = %err,
                    "trends upstream rate limited, retrying after cool-down"
                );
                notifier.notify(NoticeLevel::Warning, RETRY_NOTICE);
                tokio::time::sleep(policy.cooldown).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use tokio::time::Instant;

    use trendscope_core::NoticeLog;

    use super::*;

    fn rate_limited() -> TrendsError {
        TrendsError::RateLimited {
            url: "https://trends.example.com/trends/api/explore".to_owned(),
        }
    }

    fn immediate(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            cooldown: Duration::ZERO,
        }
    }

    #[test]
    fn default_policy_is_five_attempts_one_minute_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.cooldown, Duration::from_secs(60));
        assert_eq!(policy.worst_case_wait(), Duration::from_secs(240));
    }

    #[test]
    fn worst_case_wait_with_single_attempt_is_zero() {
        assert_eq!(immediate(1).worst_case_wait(), Duration::ZERO);
        let zero = RetryPolicy {
            max_attempts: 0,
            cooldown: Duration::from_secs(60),
        };
        assert_eq!(zero.worst_case_wait(), Duration::ZERO);
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let result = retry_on_rate_limit(immediate(5), &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, TrendsError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(log.notices().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_five_attempts_with_fixed_cooldown() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let started = Instant::now();

        let result = retry_on_rate_limit(RetryPolicy::default(), &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;

        let waited = started.elapsed();
        assert!(matches!(result, Err(TrendsError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(log.count(NoticeLevel::Warning), 4);
        assert!(
            waited >= Duration::from_secs(240) && waited < Duration::from_secs(241),
            "expected four 60s waits, waited {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn non_rate_limit_error_is_not_retried_or_delayed() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let started = Instant::now();

        let result = retry_on_rate_limit(RetryPolicy::default(), &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(TrendsError::UnexpectedStatus {
                    status: 500,
                    url: "https://trends.example.com".to_owned(),
                })
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(TrendsError::UnexpectedStatus { status: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(log.notices().is_empty());
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let result = retry_on_rate_limit(immediate(5), &log, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, TrendsError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(log.count(NoticeLevel::Warning), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let result = retry_on_rate_limit(immediate(0), &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(log.notices().is_empty());
    }

    #[tokio::test]
    async fn malformed_response_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let log = NoticeLog::new();
        let c = Arc::clone(&calls);
        let result = retry_on_rate_limit(immediate(5), &log, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                let e = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
                Err::<u32, _>(TrendsError::Deserialize {
                    context: "test".to_owned(),
                    source: e,
                })
            }
        })
        .await;
        assert!(matches!(result, Err(TrendsError::Deserialize { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
