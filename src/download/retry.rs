//! Retrying download of a single link.

use std::path::Path;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::download::outcome::DownloadOutcome;
use crate::fetch::{Browser, FetchError, MediaFetcher};

/// Default attempt budget per link, including the first attempt.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Default wait between attempts. Jitter is opt-in through `RetryPolicy::new`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default extra wait after the remote rate-limits us.
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(300);

/// How often and how patiently a link is retried.
///
/// Worst-case time spent on one link is
/// `(max_attempts - 1) * (delay_max + rate_limit_cooldown)` plus the attempts
/// themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay_min: Duration,
    delay_max: Duration,
    rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_min: DEFAULT_RETRY_DELAY,
            delay_max: DEFAULT_RETRY_DELAY,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is at least 1 and the delay bounds are
    /// swapped if given in the wrong order.
    pub fn new(
        max_attempts: u32,
        delay_min: Duration,
        delay_max: Duration,
        rate_limit_cooldown: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay_min: delay_min.min(delay_max),
            delay_max: delay_max.max(delay_min),
            rate_limit_cooldown,
        }
    }

    /// Policy with one fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration, rate_limit_cooldown: Duration) -> Self {
        Self::new(max_attempts, delay, delay, rate_limit_cooldown)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn rate_limit_cooldown(&self) -> Duration {
        self.rate_limit_cooldown
    }

    /// Wait before the next attempt, drawn from `[delay_min, delay_max]`.
    pub fn retry_delay(&self) -> Duration {
        if self.delay_min == self.delay_max {
            return self.delay_min;
        }
        let millis = rand::thread_rng()
            .gen_range(self.delay_min.as_millis() as u64..=self.delay_max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// Download one link, retrying transient failures.
///
/// A rate-limit response consumes its attempt and adds one cooldown before
/// the usual delay. No wait follows the final attempt. Exhausting the budget
/// yields a non-retriable `Failure`; it is never raised as an error.
pub async fn download_one(
    fetcher: &dyn MediaFetcher,
    link: &str,
    output_dir: &Path,
    cookies: Option<Browser>,
    policy: &RetryPolicy,
) -> DownloadOutcome {
    let max_attempts = policy.max_attempts();
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        let error = match fetcher.fetch(link, output_dir, cookies).await {
            Ok(info) => {
                return DownloadOutcome::Success {
                    info,
                    attempts: attempt,
                }
            }
            Err(error) => error,
        };

        last_error = error.to_string();

        if !error.is_retriable() {
            tracing::error!("{}: {}", link, error);
            return DownloadOutcome::Failure {
                reason: last_error,
                retriable: false,
                attempts: attempt,
            };
        }

        if attempt == max_attempts {
            break;
        }

        if let FetchError::RateLimited(_) = error {
            let cooldown = policy.rate_limit_cooldown();
            tracing::warn!(
                "Rate limited on {} (attempt {}/{}), cooling down for {}s",
                link,
                attempt,
                max_attempts,
                cooldown.as_secs()
            );
            sleep(cooldown).await;
        }

        let delay = policy.retry_delay();
        tracing::warn!(
            "Attempt {}/{} for {} failed: {}. Retrying in {:.1}s",
            attempt,
            max_attempts,
            link,
            error,
            delay.as_secs_f64()
        );
        sleep(delay).await;
    }

    tracing::error!("Giving up on {} after {} attempts", link, max_attempts);
    DownloadOutcome::Failure {
        reason: last_error,
        retriable: false,
        attempts: max_attempts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MediaInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Fetcher failing with scripted errors, then succeeding.
    struct ScriptedFetcher {
        failures: Mutex<Vec<FetchError>>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn new(failures: Vec<FetchError>) -> Self {
            Self {
                failures: Mutex::new(failures.into_iter().rev().collect()),
                calls: AtomicU32::new(0),
            }
        }

        fn failing(times: usize) -> Self {
            Self::new(vec![FetchError::Transport("reset".into()); times])
        }
    }

    #[async_trait]
    impl MediaFetcher for ScriptedFetcher {
        async fn fetch(
            &self,
            uri: &str,
            _output_dir: &Path,
            _cookies: Option<Browser>,
        ) -> Result<MediaInfo, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failures.lock().unwrap().pop() {
                Some(error) => Err(error),
                None => Ok(MediaInfo {
                    id: "1".into(),
                    title: uri.into(),
                    upload_date: None,
                    path: None,
                }),
            }
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::fixed(60, Duration::from_secs(5), Duration::from_secs(300))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_last_attempt() {
        let fetcher = ScriptedFetcher::failing(59);
        let outcome = download_one(&fetcher, "https://a", Path::new("."), None, &policy()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.attempts(), 60);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_report_failure() {
        let fetcher = ScriptedFetcher::failing(60);
        let start = Instant::now();

        let outcome = download_one(&fetcher, "https://a", Path::new("."), None, &policy()).await;

        assert_eq!(
            outcome,
            DownloadOutcome::Failure {
                reason: "Transport error: reset".into(),
                retriable: false,
                attempts: 60,
            }
        );
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 60);
        // 59 waits, none after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(59 * 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_adds_cooldown_and_consumes_attempt() {
        let fetcher = ScriptedFetcher::new(vec![
            FetchError::Transport("reset".into()),
            FetchError::RateLimited("HTTP Error 429".into()),
        ]);
        let start = Instant::now();

        let outcome = download_one(&fetcher, "https://a", Path::new("."), None, &policy()).await;

        assert_eq!(outcome.attempts(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(5 + 300 + 5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_leaves_remaining_attempts() {
        let tight = RetryPolicy::fixed(3, Duration::from_secs(1), Duration::from_secs(10));
        let fetcher = ScriptedFetcher::new(vec![
            FetchError::RateLimited("429".into()),
            FetchError::Transport("reset".into()),
            FetchError::Transport("reset".into()),
        ]);

        let outcome = download_one(&fetcher, "https://a", Path::new("."), None, &tight).await;

        assert!(!outcome.is_success());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tool_missing_is_not_retried() {
        let fetcher = ScriptedFetcher::new(vec![FetchError::ToolMissing("yt-dlp".into())]);

        let outcome = download_one(&fetcher, "https://a", Path::new("."), None, &policy()).await;

        assert!(matches!(
            outcome,
            DownloadOutcome::Failure { retriable: false, attempts: 1, .. }
        ));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_delay_within_bounds() {
        let policy = RetryPolicy::new(
            60,
            Duration::from_secs(10),
            Duration::from_secs(5),
            Duration::ZERO,
        );
        for _ in 0..100 {
            let delay = policy.retry_delay();
            assert!(delay >= Duration::from_secs(5) && delay <= Duration::from_secs(10));
        }
    }

    #[test]
    fn test_default_delay_is_fixed() {
        let policy = RetryPolicy::default();
        for _ in 0..20 {
            assert_eq!(policy.retry_delay(), DEFAULT_RETRY_DELAY);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_waits_the_same_between_attempts() {
        let fetcher = ScriptedFetcher::failing(3);
        let start = Instant::now();

        let outcome =
            download_one(&fetcher, "https://a", Path::new("."), None, &RetryPolicy::default())
                .await;

        assert_eq!(outcome.attempts(), 4);
        assert_eq!(start.elapsed(), DEFAULT_RETRY_DELAY * 3);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::fixed(0, Duration::ZERO, Duration::ZERO).max_attempts(), 1);
    }
}
