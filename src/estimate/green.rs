//! Green hosting classification.
//!
//! Hosts on a known renewable-powered platform are green without a lookup.
//! Everything else is checked against the green hosting registry; a failed
//! lookup counts as "not green" and never fails the analysis.

use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use crate::app::host_of;
use crate::config::GREEN_HOSTING_SUFFIXES;
use crate::error_handling::{categorize_reqwest_error, UpstreamError};
use crate::utils::with_retry;

const SERVICE: &str = "green registry";

/// Which rule decided a green verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreenSource {
    /// Hostname is on a known green platform
    Allowlist,
    /// Registry answered
    Registry,
    /// Registry skipped or failed; allowlist miss stands
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreenVerdict {
    pub green: bool,
    pub source: GreenSource,
    /// The registry was queried and failed
    pub registry_failed: bool,
}

/// Decides whether a site runs on renewable-powered hosting.
#[derive(Clone)]
pub struct GreenClassifier {
    registry: Option<(Arc<reqwest::Client>, String)>,
}

impl GreenClassifier {
    /// Classifier backed by the registry at `registry_url`.
    pub fn new(client: Arc<reqwest::Client>, registry_url: impl Into<String>) -> Self {
        Self {
            registry: Some((client, registry_url.into())),
        }
    }

    /// Classifier that only consults the allowlist.
    pub fn allowlist_only() -> Self {
        Self { registry: None }
    }

    /// Shorthand for `classify(url).green`.
    pub async fn is_green(&self, url: &Url) -> bool {
        self.classify(url).await.green
    }

    /// Classifies the host of `url`. Never fails.
    pub async fn classify(&self, url: &Url) -> GreenVerdict {
        let host = host_of(url);
        if on_green_platform(&host) {
            debug!("{host} is on a known green hosting platform");
            return GreenVerdict {
                green: true,
                source: GreenSource::Allowlist,
                registry_failed: false,
            };
        }

        let Some((client, registry_url)) = &self.registry else {
            return GreenVerdict {
                green: false,
                source: GreenSource::Fallback,
                registry_failed: false,
            };
        };

        match with_retry(|| lookup(client, registry_url, &host)).await {
            Ok(green) => {
                debug!("Green registry verdict for {host}: {green}");
                GreenVerdict {
                    green,
                    source: GreenSource::Registry,
                    registry_failed: false,
                }
            }
            Err(e) => {
                warn!("Green registry lookup failed for {host}, assuming standard hosting: {e}");
                GreenVerdict {
                    green: false,
                    source: GreenSource::Fallback,
                    registry_failed: true,
                }
            }
        }
    }
}

/// Whether `host` equals or is a subdomain of a known green platform.
pub fn on_green_platform(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    GREEN_HOSTING_SUFFIXES.iter().any(|suffix| {
        host == *suffix
            || host
                .strip_suffix(suffix)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

async fn lookup(
    client: &reqwest::Client,
    registry_url: &str,
    host: &str,
) -> Result<bool, UpstreamError> {
    let endpoint = format!("{}/{}", registry_url.trim_end_matches('/'), host);
    let response = client
        .get(&endpoint)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

    body.get("green")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| UpstreamError::Malformed {
            service: SERVICE,
            reason: "missing boolean 'green' field".to_string(),
        })
}
