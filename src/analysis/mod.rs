//! Analysis orchestration.
//!
//! [`Analyzer::analyze`] drives one request through
//! `Received → Estimating → Scoring → Narrating → Persisted → Returned`.
//! Upstream failures are absorbed by the provider and narrator. An analysis
//! that outruns its deadline is answered from the offline heuristic and the
//! template narrative. Only invalid input, cancellation and a crashed pipeline
//! surface as errors. A storage failure degrades to an unsaved result.

mod cache;
mod models;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::normalize_url;
use crate::config::{analysis_deadline, Config, DEFAULT_TIMEOUT_SECS};
use crate::error_handling::{
    AnalysisError, DatabaseError, ErrorType, FallbackType, ProcessingStats, UpstreamError,
};
use crate::estimate::{ByteEstimator, GreenClassifier};
use crate::narrative::{ChatClient, ModelNarrator, Narrative, Narrator, TemplateNarrator};
use crate::provider::{
    ExternalProvider, HeuristicProvider, MetricsProvider, MetricsSource,
};
use crate::storage::AnalysisStore;

pub use cache::RecentAnalysesCache;
pub use models::{AnalysisReport, AnalysisResult, StoredAnalysis};

/// Runs analyses and serves their history.
pub struct Analyzer {
    provider: Arc<dyn MetricsProvider>,
    narrator: Arc<dyn Narrator>,
    store: Arc<dyn AnalysisStore>,
    cache: RecentAnalysesCache,
    stats: Arc<ProcessingStats>,
    deadline: Duration,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn MetricsProvider>,
        narrator: Arc<dyn Narrator>,
        store: Arc<dyn AnalysisStore>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            provider,
            narrator,
            store,
            cache: RecentAnalysesCache::new(cache_capacity),
            stats: Arc::new(ProcessingStats::new()),
            deadline: analysis_deadline(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Replaces the overall deadline of one analysis.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Wires providers and narrator from configuration.
    pub fn from_config(
        config: &Config,
        client: Arc<reqwest::Client>,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        let bytes = if config.probe_pages {
            ByteEstimator::new(Arc::clone(&client))
                .allow_private_targets(config.allow_private_targets)
        } else {
            ByteEstimator::heuristic_only()
        };
        let heuristic = HeuristicProvider::new(
            bytes,
            GreenClassifier::new(Arc::clone(&client), config.green_registry_url.clone()),
        );

        let provider: Arc<dyn MetricsProvider> = if config.use_external_api {
            Arc::new(ExternalProvider::new(
                Arc::clone(&client),
                config.carbon_api_url.clone(),
                heuristic,
            ))
        } else {
            Arc::new(heuristic)
        };

        let chat = ChatClient::new(
            client,
            config.narrative_api_url.clone(),
            config.narrative_api_key.clone(),
            config.narrative_model.clone(),
        );
        let narrator: Arc<dyn Narrator> = if chat.is_configured() {
            Arc::new(ModelNarrator::new(chat))
        } else {
            info!("No narrative API key configured; summaries use the built-in template");
            Arc::new(TemplateNarrator)
        };

        let deadline = config.analysis_deadline();
        info!(
            "Analyzer ready (provider: {}, byte probe: {}, deadline: {}s)",
            provider.name(),
            config.probe_pages,
            deadline.as_secs()
        );
        Self::new(provider, narrator, store, config.recent_cache_capacity).with_deadline(deadline)
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn cache(&self) -> &RecentAnalysesCache {
        &self.cache
    }

    /// Analyzes the website at `input`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the URL cannot be normalized (no outbound call is made)
    /// - `Cancelled` when `cancel` fires first (nothing is persisted)
    /// - `Failed` when the estimation pipeline crashes
    pub async fn analyze(
        &self,
        input: &str,
        owner_id: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport, AnalysisError> {
        let url = normalize_url(input).inspect_err(|e| {
            warn!("Rejected analysis request: {e}");
            self.stats.increment_error(ErrorType::InvalidInput);
        })?;
        debug!("Received analysis request for {url}");

        let pipeline = tokio::spawn(compute(
            Arc::clone(&self.provider),
            Arc::clone(&self.narrator),
            Arc::clone(&self.stats),
            url.clone(),
            owner_id.clone(),
        ));
        // Dropping `analyze` (client gone) must also stop the spawned pipeline
        let guard = AbortOnDrop(pipeline.abort_handle());

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            joined = tokio::time::timeout(self.deadline, pipeline) => Some(joined),
        };
        drop(guard);

        let (result, source) = match outcome {
            Some(Ok(Ok(computed))) if !cancel.is_cancelled() => computed,
            Some(Ok(Ok(_))) | None => {
                info!("Analysis of {url} cancelled");
                self.stats.increment_error(ErrorType::Cancelled);
                return Err(AnalysisError::Cancelled);
            }
            Some(Ok(Err(join_error))) => {
                let err =
                    AnalysisError::Failed(format!("pipeline for {url} crashed: {join_error}"));
                error!("{err}");
                self.stats.increment_error(ErrorType::AnalysisFailed);
                return Err(err);
            }
            Some(Err(_elapsed)) => {
                warn!(
                    "Analysis of {url} exceeded {}s; answering from the offline heuristic",
                    self.deadline.as_secs()
                );
                self.degraded(&url, owner_id).await
            }
        };

        let saved = match self.persist(&result).await {
            Ok(stored) => {
                debug!("Persisted analysis {} for {}", stored.id, result.url());
                true
            }
            Err(e) => {
                error!("Returning unsaved analysis for {}: {e}", result.url());
                self.stats.increment_error(ErrorType::PersistenceFailed);
                false
            }
        };
        self.stats.record_completed(saved);
        debug!("Returning analysis for {url} (grade {}, saved: {saved})", result.eco_score());

        Ok(AnalysisReport {
            result,
            saved,
            source,
        })
    }

    /// Result built without any outbound call.
    async fn degraded(
        &self,
        url: &Url,
        owner_id: Option<String>,
    ) -> (AnalysisResult, MetricsSource) {
        self.stats.increment_fallback(FallbackType::AnalysisDeadline);
        let output = HeuristicProvider::offline().metrics(url).await;
        let narrative = Narrative::fallback(&output.metrics);
        let result = AnalysisResult::new(url, output.metrics, narrative, owner_id);
        (result, output.source)
    }

    async fn persist(&self, result: &AnalysisResult) -> Result<StoredAnalysis, AnalysisError> {
        let stored = self.store.append(result).await?;
        self.cache.push(stored.clone());
        Ok(stored)
    }

    /// Latest analyses across owners, from the cache when it holds enough.
    pub async fn recent_global(&self, limit: usize) -> Result<Vec<StoredAnalysis>, DatabaseError> {
        if let Some(cached) = self.cache.recent(limit) {
            return Ok(cached);
        }
        self.store.recent_global(limit).await
    }

    pub async fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredAnalysis>, DatabaseError> {
        self.store.recent_for_owner(owner_id, limit).await
    }

    /// Loads the newest stored analyses into the cache.
    pub async fn warm_cache(&self) -> Result<usize, DatabaseError> {
        let recent = self.store.recent_global(self.cache.capacity()).await?;
        let count = recent.len();
        self.cache.warm(recent);
        Ok(count)
    }

    /// Free-form sustainability question for the narrative model.
    pub async fn ask(&self, question: &str) -> Result<String, UpstreamError> {
        self.narrator.ask(question).await
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn compute(
    provider: Arc<dyn MetricsProvider>,
    narrator: Arc<dyn Narrator>,
    stats: Arc<ProcessingStats>,
    url: Url,
    owner_id: Option<String>,
) -> (AnalysisResult, MetricsSource) {
    debug!("Estimating {url} with {} provider", provider.name());
    let output = provider.metrics(&url).await;
    for fallback in &output.fallbacks {
        stats.increment_fallback(*fallback);
    }

    debug!(
        "Scoring {url}: {} bytes, green={}, cleaner than {}%",
        output.metrics.bytes, output.metrics.green, output.metrics.cleaner_than_percent
    );

    debug!("Narrating {url}");
    let narration = narrator.narrate(&url, &output.metrics).await;
    if narration.fell_back {
        stats.increment_fallback(FallbackType::NarrativeModel);
    }

    let result = AnalysisResult::new(&url, output.metrics, narration.narrative, owner_id);
    (result, output.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::estimate::{CarbonMetrics, EcoScore};
    use crate::provider::ProviderOutput;
    use crate::storage::test_helpers::create_test_pool;
    use crate::storage::SqliteAnalysisStore;

    struct FixedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetricsProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn metrics(&self, _url: &Url) -> ProviderOutput {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProviderOutput {
                metrics: CarbonMetrics::from_page(650_000, false),
                source: MetricsSource::Internal,
                fallbacks: vec![FallbackType::ByteProbe],
            }
        }
    }

    struct PendingProvider;

    #[async_trait]
    impl MetricsProvider for PendingProvider {
        fn name(&self) -> &'static str {
            "pending"
        }

        async fn metrics(&self, _url: &Url) -> ProviderOutput {
            std::future::pending().await
        }
    }

    struct CrashingProvider;

    #[async_trait]
    impl MetricsProvider for CrashingProvider {
        fn name(&self) -> &'static str {
            "crashing"
        }

        async fn metrics(&self, _url: &Url) -> ProviderOutput {
            panic!("provider bug")
        }
    }

    struct FailingStore;

    #[async_trait]
    impl AnalysisStore for FailingStore {
        async fn append(&self, _: &AnalysisResult) -> Result<StoredAnalysis, DatabaseError> {
            Err(DatabaseError::FileCreationError("disk full".into()))
        }

        async fn recent_for_owner(
            &self,
            _: &str,
            _: usize,
        ) -> Result<Vec<StoredAnalysis>, DatabaseError> {
            Ok(Vec::new())
        }

        async fn recent_global(&self, _: usize) -> Result<Vec<StoredAnalysis>, DatabaseError> {
            Ok(Vec::new())
        }
    }

    async fn sqlite_store() -> Arc<SqliteAnalysisStore> {
        Arc::new(SqliteAnalysisStore::new(Arc::new(create_test_pool().await)))
    }

    fn fixed_provider() -> Arc<FixedProvider> {
        Arc::new(FixedProvider {
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_analyze_persists_and_caches() {
        let store = sqlite_store().await;
        let analyzer = Analyzer::new(fixed_provider(), Arc::new(TemplateNarrator), store.clone(), 10);

        let report = analyzer
            .analyze("example.com", Some("me".into()), &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.saved);
        assert_eq!(report.source, MetricsSource::Internal);
        assert_eq!(report.result.url(), "https://example.com/");
        assert_eq!(report.result.eco_score(), EcoScore::C);
        assert_eq!(analyzer.cache().len(), 1);
        assert_eq!(store.recent_for_owner("me", 10).await.unwrap().len(), 1);
        assert_eq!(analyzer.stats().completed(), 1);
        assert_eq!(analyzer.stats().get_fallback_count(FallbackType::ByteProbe), 1);
        assert_eq!(analyzer.stats().get_fallback_count(FallbackType::NarrativeModel), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_skips_provider() {
        let provider = fixed_provider();
        let analyzer = Analyzer::new(
            provider.clone(),
            Arc::new(TemplateNarrator),
            sqlite_store().await,
            10,
        );

        let err = analyzer
            .analyze("not a url", None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(analyzer.stats().get_error_count(ErrorType::InvalidInput), 1);
    }

    #[tokio::test]
    async fn test_cancelled_analysis_persists_nothing() {
        let store = sqlite_store().await;
        let analyzer = Analyzer::new(Arc::new(PendingProvider), Arc::new(TemplateNarrator), store.clone(), 10);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = analyzer.analyze("example.com", None, &cancel).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
        assert!(store.recent_global(10).await.unwrap().is_empty());
        assert_eq!(analyzer.stats().get_error_count(ErrorType::Cancelled), 1);
    }

    #[tokio::test]
    async fn test_deadline_answers_from_offline_heuristic() {
        let store = sqlite_store().await;
        let analyzer = Analyzer::new(Arc::new(PendingProvider), Arc::new(TemplateNarrator), store.clone(), 10)
            .with_deadline(std::time::Duration::from_millis(50));

        let report = analyzer
            .analyze("news.example.org", Some("me".into()), &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.saved);
        assert_eq!(report.source, MetricsSource::Internal);
        assert_eq!(report.result.bytes(), 800_000);
        assert_eq!(report.result.suggestions().len(), crate::config::FALLBACK_SUGGESTIONS.len());
        assert_eq!(store.recent_for_owner("me", 10).await.unwrap().len(), 1);
        assert_eq!(analyzer.stats().get_fallback_count(FallbackType::AnalysisDeadline), 1);
        assert_eq!(analyzer.stats().get_error_count(ErrorType::AnalysisFailed), 0);
    }

    #[tokio::test]
    async fn test_crashed_pipeline_reports_failure() {
        let store = sqlite_store().await;
        let analyzer = Analyzer::new(Arc::new(CrashingProvider), Arc::new(TemplateNarrator), store.clone(), 10);

        let err = analyzer
            .analyze("example.com", None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Failed(_)));
        assert!(err.to_string().contains("https://example.com/"));
        assert!(store.recent_global(10).await.unwrap().is_empty());
        assert_eq!(analyzer.stats().get_error_count(ErrorType::AnalysisFailed), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_returns_unsaved_result() {
        let analyzer = Analyzer::new(fixed_provider(), Arc::new(TemplateNarrator), Arc::new(FailingStore), 10);

        let report = analyzer
            .analyze("https://example.com", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(!report.saved);
        assert_eq!(report.result.co2_grams(), 0.321);
        assert!(analyzer.cache().is_empty());
        assert_eq!(analyzer.stats().unsaved(), 1);
        assert_eq!(analyzer.stats().get_error_count(ErrorType::PersistenceFailed), 1);
    }

    #[tokio::test]
    async fn test_recent_global_prefers_cache_then_storage() {
        let store = sqlite_store().await;
        let analyzer = Analyzer::new(fixed_provider(), Arc::new(TemplateNarrator), store.clone(), 10);
        for site in ["a.example", "b.example"] {
            analyzer.analyze(site, None, &CancellationToken::new()).await.unwrap();
        }

        let cached = analyzer.recent_global(2).await.unwrap();
        assert_eq!(cached[0].result.url(), "https://b.example/");

        let fresh = Analyzer::new(fixed_provider(), Arc::new(TemplateNarrator), store, 10);
        assert!(fresh.cache().is_empty());
        assert_eq!(fresh.recent_global(2).await.unwrap(), cached);
        assert_eq!(fresh.warm_cache().await.unwrap(), 2);
        assert_eq!(fresh.cache().len(), 2);
    }
}
