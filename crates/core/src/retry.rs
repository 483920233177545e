//! Transport retry for store adapters
//!
//! Store adapters wrap each request in [`retry_with_backoff`]. The executor
//! does not retry; a failure that survives this layer is final for that
//! object.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Retry `operation` with exponential backoff and jitter while `is_retryable`
/// holds and attempts remain
pub async fn retry_with_backoff<T, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < config.max_attempts && is_retryable(&e) => {
                let backoff = calculate_backoff(config, attempt);
                tracing::debug!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "Retrying store request"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// initial * 2^(attempt-1), capped, plus up to the same again in jitter
fn calculate_backoff(config: &RetryConfig, attempt: u32) -> Duration {
    let base_ms = config
        .initial_backoff_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10));
    let capped_ms = base_ms.min(config.max_backoff_ms);
    Duration::from_millis(capped_ms + jitter(capped_ms))
}

fn jitter(max: u64) -> u64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos() as u64;
    nanos % max.max(1)
}

/// Transient store failures: throttling, timeouts, dropped connections
pub fn is_retryable_error(error: &Error) -> bool {
    match error {
        Error::Network(msg) => {
            let msg = msg.to_lowercase();
            [
                "timeout",
                "timed out",
                "connection reset",
                "connection refused",
                "dispatch",
                "503",
                "service unavailable",
                "429",
                "too many requests",
                "slow down",
                "slowdown",
                "internalerror",
            ]
            .iter()
            .any(|needle| msg.contains(needle))
        }
        Error::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::Interrupted
        ),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_backoff_ms: 100,
            max_backoff_ms: 1000,
        };
        let b1 = calculate_backoff(&config, 1).as_millis();
        assert!((100..200).contains(&b1));
        let b3 = calculate_backoff(&config, 3).as_millis();
        assert!((400..800).contains(&b3));
        let b9 = calculate_backoff(&config, 9).as_millis();
        assert!((1000..2000).contains(&b9));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable_error(&Error::Network("Request timeout".into())));
        assert!(is_retryable_error(&Error::Network("Service error: SlowDown".into())));
        assert!(!is_retryable_error(&Error::Network("AccessDenied".into())));
        assert!(!is_retryable_error(&Error::NotFound("s3://b/k".into())));
        assert!(!is_retryable_error(&Error::Auth("denied".into())));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            &fast(3),
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Error::Network("connection reset by peer".into()))
                    } else {
                        Ok("done")
                    }
                }
            },
            is_retryable_error,
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let mut calls = 0;
        let result: Result<()> = retry_with_backoff(
            &fast(2),
            || {
                calls += 1;
                async { Err(Error::Network("503".into())) }
            },
            is_retryable_error,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut calls = 0;
        let result: Result<()> = retry_with_backoff(
            &fast(5),
            || {
                calls += 1;
                async { Err(Error::NotFound("s3://b/k".into())) }
            },
            is_retryable_error,
        )
        .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(calls, 1);
    }
}
