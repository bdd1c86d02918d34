//! Upstream error categorization and retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::UpstreamError;

/// Creates the retry strategy for outbound calls.
///
/// Exponential backoff starting at `RETRY_INITIAL_DELAY_MS`, capped at
/// `RETRY_MAX_DELAY_SECS`, limited to `RETRY_MAX_RETRIES` retries after the
/// initial attempt.
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_RETRIES)
}

/// Maps a `reqwest::Error` raised while talking to `service` into an `UpstreamError`.
///
/// Status errors (from `error_for_status`) keep their status code so that retry
/// decisions can distinguish 5xx/429 from permanent 4xx answers.
pub fn categorize_reqwest_error(service: &'static str, error: reqwest::Error) -> UpstreamError {
    if let Some(status) = error.status() {
        return UpstreamError::BadStatus {
            service,
            status: status.as_u16(),
        };
    }
    if error.is_decode() {
        return UpstreamError::Malformed {
            service,
            reason: error.to_string(),
        };
    }
    UpstreamError::Unavailable {
        service,
        source: error,
    }
}
