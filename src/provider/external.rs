//! External carbon API adapter.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use super::payload::{parse_carbon_payload, SERVICE};
use super::{HeuristicProvider, MetricsProvider, MetricsSource, ProviderOutput};
use crate::error_handling::{categorize_reqwest_error, FallbackType, UpstreamError};
use crate::estimate::CarbonMetrics;
use crate::utils::with_retry;

/// Carbon metrics from the external API, with the internal chain as fallback.
///
/// The external service is advisory: when it fails, the output is exactly what
/// the wrapped `HeuristicProvider` produces for the same URL.
#[derive(Clone)]
pub struct ExternalProvider {
    client: Arc<reqwest::Client>,
    api_url: String,
    fallback: HeuristicProvider,
}

impl ExternalProvider {
    pub fn new(
        client: Arc<reqwest::Client>,
        api_url: impl Into<String>,
        fallback: HeuristicProvider,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            fallback,
        }
    }

    /// Queries the carbon API once (plus one retry on transient failure).
    ///
    /// # Errors
    ///
    /// Any non-success status, network error, timeout or unusable payload.
    pub async fn fetch_external(&self, url: &Url) -> Result<CarbonMetrics, UpstreamError> {
        with_retry(|| self.request(url)).await
    }

    async fn request(&self, url: &Url) -> Result<CarbonMetrics, UpstreamError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("url", url.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| categorize_reqwest_error(SERVICE, e))?;

        parse_carbon_payload(&body)
    }
}

#[async_trait]
impl MetricsProvider for ExternalProvider {
    fn name(&self) -> &'static str {
        "external"
    }

    async fn metrics(&self, url: &Url) -> ProviderOutput {
        match self.fetch_external(url).await {
            Ok(metrics) => {
                debug!("Carbon API metrics for {url}: {metrics:?}");
                ProviderOutput {
                    metrics,
                    source: MetricsSource::External,
                    fallbacks: Vec::new(),
                }
            }
            Err(e) => {
                warn!("Carbon API unavailable for {url}, using internal estimate: {e}");
                let mut output = self.fallback.metrics(url).await;
                output.fallbacks.insert(0, FallbackType::CarbonApi);
                output
            }
        }
    }
}
