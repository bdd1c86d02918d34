//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS};
use crate::error_handling::InitializationError;
use crate::security::redirect_policy;

/// Initializes the HTTP client shared by every outbound call.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the configuration
/// - Request timeout from the configuration
/// - TCP connect timeout (`TCP_CONNECT_TIMEOUT_SECS`)
/// - Redirect policy that stops at private targets unless
///   `allow_private_targets` is set (see [`redirect_policy`])
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .redirect(redirect_policy(config.allow_private_targets))
        .build()?;
    Ok(Arc::new(client))
}
