//! Blocking HTTP client used for the once-per-batch exchange-rate fetch.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{ExtractorError, Result};

/// User agent string identifying this extractor.
const USER_AGENT: &str = concat!("ted-extractor/", env!("CARGO_PKG_VERSION"));

/// How often and how patiently a request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before the given zero-based attempt.
    ///
    /// Saturates at [`Duration::MAX`] for very late attempts; a zero base
    /// delay stays zero.
    #[must_use]
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match 1u32.checked_shl(attempt - 1) {
            Some(factor) => self.base_delay.saturating_mul(factor),
            None if self.base_delay.is_zero() => Duration::ZERO,
            None => Duration::MAX,
        }
    }
}

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download a response body, retrying transient failures.
///
/// Server errors (5xx), connection failures and timeouts are retried with
/// exponential backoff. Client errors (4xx) and malformed URLs fail at once.
///
/// # Errors
/// Returns `Http` for non-transient failures and `RetriesExhausted` once
/// every attempt has failed.
pub fn download_bytes_with(client: &Client, url: &str, policy: RetryPolicy) -> Result<Vec<u8>> {
    let mut last_error = String::from("no attempt made");

    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_before(attempt);
        if !delay.is_zero() {
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
            thread::sleep(delay);
        }

        let response = match client.get(url).send() {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    "Connection error, will retry"
                );
                last_error = e.to_string();
                continue;
            }
            Err(e) => return Err(ExtractorError::Http(e)),
        };

        let status = response.status();
        if status.is_server_error() {
            tracing::warn!(
                status = %status,
                attempt = attempt + 1,
                max_attempts = policy.max_attempts,
                "Server error, will retry"
            );
            last_error = format!("Server error: {status}");
            continue;
        }

        let bytes = response.error_for_status()?.bytes()?;
        return Ok(bytes.to_vec());
    }

    Err(ExtractorError::RetriesExhausted {
        attempts: policy.max_attempts,
        message: last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("ted-extractor/"));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(0), Duration::ZERO);
        assert_eq!(policy.delay_before(1), Duration::from_millis(500));
        assert_eq!(policy.delay_before(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_before(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_saturates_for_late_attempts() {
        let policy = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_before(33), Duration::MAX);
        assert_eq!(policy.delay_before(u32::MAX), Duration::MAX);
        assert_eq!(
            policy.delay_before(32),
            Duration::from_millis(500).saturating_mul(1 << 31)
        );

        let no_wait = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::ZERO,
        };
        assert_eq!(no_wait.delay_before(33), Duration::ZERO);
    }

    #[test]
    fn test_invalid_url_not_retried() {
        let client = create_client().unwrap();
        let result = download_bytes_with(&client, "not a url", RetryPolicy::default());
        assert!(matches!(result, Err(ExtractorError::Http(_))));
    }

    #[test]
    fn test_zero_attempts_exhausted() {
        let client = create_client().unwrap();
        let policy = RetryPolicy {
            max_attempts: 0,
            base_delay: Duration::ZERO,
        };
        let result = download_bytes_with(&client, "http://127.0.0.1:9/", policy);
        assert!(matches!(
            result,
            Err(ExtractorError::RetriesExhausted { attempts: 0, .. })
        ));
    }
}
