//! Metrics providers.
//!
//! The orchestrator asks one [`MetricsProvider`] for the carbon metrics of a URL.
//! Two implementations exist:
//! - [`HeuristicProvider`]: byte estimator + green classifier + calculator
//! - [`ExternalProvider`]: the external carbon API, falling back to a
//!   `HeuristicProvider` on any failure

mod external;
mod heuristic;
mod payload;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::error_handling::FallbackType;
use crate::estimate::CarbonMetrics;

pub use external::ExternalProvider;
pub use heuristic::HeuristicProvider;

/// Which path produced a set of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    External,
    Internal,
}

/// Metrics plus the fallbacks taken to obtain them.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutput {
    pub metrics: CarbonMetrics,
    pub source: MetricsSource,
    pub fallbacks: Vec<FallbackType>,
}

/// Source of carbon metrics for a URL.
///
/// Implementations must not fail: upstream problems are resolved locally and
/// reported through `ProviderOutput::fallbacks`.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Metrics for an already-normalized URL.
    async fn metrics(&self, url: &Url) -> ProviderOutput;
}
