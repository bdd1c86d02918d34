//! Page weight estimation.
//!
//! A HEAD probe reads the target's `Content-Length`. When the probe is disabled,
//! fails, or the header is missing, the hostname is matched against the
//! `SITE_CATEGORIES` table instead. Targets on loopback, private or link-local
//! addresses are never probed unless explicitly allowed.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::header::CONTENT_LENGTH;
use url::Url;

use crate::app::host_of;
use crate::config::{DEFAULT_PAGE_BYTES, SITE_CATEGORIES};
use crate::error_handling::{categorize_reqwest_error, UpstreamError};
use crate::security::validate_target;
use crate::utils::with_retry;

const SERVICE: &str = "page probe";

/// Where a byte count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteSource {
    /// `Content-Length` of a HEAD response
    Measured,
    /// Hostname heuristic; carries the matched category (`"default"` if none)
    Heuristic(&'static str),
}

/// Result of a byte estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteEstimate {
    pub bytes: u64,
    pub source: ByteSource,
    /// A probe was attempted and did not yield a size
    pub probe_failed: bool,
}

/// Estimates page weight for URLs.
#[derive(Clone)]
pub struct ByteEstimator {
    client: Option<Arc<reqwest::Client>>,
    allow_private_targets: bool,
}

impl ByteEstimator {
    /// Estimator that probes targets with `client` before falling back.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self {
            client: Some(client),
            allow_private_targets: false,
        }
    }

    /// Estimator that never touches the network.
    pub fn heuristic_only() -> Self {
        Self {
            client: None,
            allow_private_targets: false,
        }
    }

    /// Lets the probe reach loopback, private and link-local targets.
    pub fn allow_private_targets(mut self, allow: bool) -> Self {
        self.allow_private_targets = allow;
        self
    }

    /// Estimates the transfer size of `url` in bytes. Never fails.
    pub async fn estimate(&self, url: &Url) -> ByteEstimate {
        let host = host_of(url);
        let Some(client) = &self.client else {
            return heuristic_estimate(&host, false);
        };
        if !self.allow_private_targets {
            if let Err(reason) = validate_target(url) {
                warn!("Not probing {url} ({reason}), using hostname heuristic");
                return heuristic_estimate(&host, true);
            }
        }

        match with_retry(|| probe_content_length(client, url)).await {
            Ok(Some(bytes)) => {
                debug!("Measured {bytes} bytes for {url} via HEAD");
                ByteEstimate {
                    bytes,
                    source: ByteSource::Measured,
                    probe_failed: false,
                }
            }
            Ok(None) => {
                debug!("HEAD {url} returned no Content-Length, using hostname heuristic");
                heuristic_estimate(&host, true)
            }
            Err(e) => {
                warn!("Page probe failed for {url}, using hostname heuristic: {e}");
                heuristic_estimate(&host, true)
            }
        }
    }
}

/// Byte count from the hostname table alone.
pub fn heuristic_bytes(host: &str) -> (u64, &'static str) {
    let host = host.to_ascii_lowercase();
    SITE_CATEGORIES
        .iter()
        .find(|category| category.patterns.iter().any(|p| host.contains(p)))
        .map(|category| (category.bytes, category.name))
        .unwrap_or((DEFAULT_PAGE_BYTES, "default"))
}

fn heuristic_estimate(host: &str, probe_failed: bool) -> ByteEstimate {
    let (bytes, category) = heuristic_bytes(host);
    ByteEstimate {
        bytes,
        source: ByteSource::Heuristic(category),
        probe_failed,
    }
}

/// Issues one HEAD request. `Ok(None)` means the server answered without a usable
/// `Content-Length`.
async fn probe_content_length(
    client: &reqwest::Client,
    url: &Url,
) -> Result<Option<u64>, UpstreamError> {
    let response = client
        .head(url.clone())
        .send()
        .await
        .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::BadStatus {
            service: SERVICE,
            status: status.as_u16(),
        });
    }

    Ok(response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok()))
}
