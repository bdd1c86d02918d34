//! Internal estimation chain.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use url::Url;

use super::{MetricsProvider, MetricsSource, ProviderOutput};
use crate::error_handling::FallbackType;
use crate::estimate::{ByteEstimator, CarbonMetrics, GreenClassifier};

/// Byte estimator + green classifier + emissions calculator.
#[derive(Clone)]
pub struct HeuristicProvider {
    bytes: ByteEstimator,
    green: GreenClassifier,
}

impl HeuristicProvider {
    pub fn new(bytes: ByteEstimator, green: GreenClassifier) -> Self {
        Self { bytes, green }
    }

    /// Network-backed chain: HEAD probe and registry lookup.
    pub fn networked(client: Arc<reqwest::Client>, registry_url: impl Into<String>) -> Self {
        Self::new(
            ByteEstimator::new(Arc::clone(&client)),
            GreenClassifier::new(client, registry_url),
        )
    }

    /// Chain that uses only the hostname table and the allowlist.
    pub fn offline() -> Self {
        Self::new(
            ByteEstimator::heuristic_only(),
            GreenClassifier::allowlist_only(),
        )
    }
}

#[async_trait]
impl MetricsProvider for HeuristicProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn metrics(&self, url: &Url) -> ProviderOutput {
        // Independent lookups; both resolve locally on failure
        let (estimate, verdict) = tokio::join!(self.bytes.estimate(url), self.green.classify(url));
        debug!(
            "Internal estimate for {url}: {} bytes ({:?}), green={} ({:?})",
            estimate.bytes, estimate.source, verdict.green, verdict.source
        );

        let mut fallbacks = Vec::new();
        if estimate.probe_failed {
            fallbacks.push(FallbackType::ByteProbe);
        }
        if verdict.registry_failed {
            fallbacks.push(FallbackType::GreenRegistry);
        }

        ProviderOutput {
            metrics: CarbonMetrics::from_page(estimate.bytes, verdict.green),
            source: MetricsSource::Internal,
            fallbacks,
        }
    }
}
