//! Bounded retry for advisory upstream calls.

use std::future::Future;

use log::debug;

use crate::error_handling::{get_retry_strategy, UpstreamError};

/// Runs `operation`, retrying transient failures per `get_retry_strategy()`.
///
/// Only errors for which `UpstreamError::is_transient` holds are retried
/// (timeouts, connection failures, 5xx, 429). Bad payloads and 4xx answers
/// return immediately so the caller can fall back without delay.
pub(crate) async fn with_retry<T, F, Fut>(operation: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    tokio_retry::RetryIf::spawn(get_retry_strategy(), operation, |e: &UpstreamError| {
        let transient = e.is_transient();
        if transient {
            debug!("Retrying after transient upstream error: {e}");
        }
        transient
    })
    .await
}
