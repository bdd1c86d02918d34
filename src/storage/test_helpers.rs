//! Shared test helpers for storage module tests.

use sqlx::SqlitePool;
use url::Url;

use crate::analysis::AnalysisResult;
use crate::estimate::CarbonMetrics;
use crate::narrative::Narrative;
use crate::storage::{init_memory_pool, run_migrations};

/// Creates an in-memory database pool with migrations applied.
pub async fn create_test_pool() -> SqlitePool {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    (*pool).clone()
}

/// A 650 kB, non-green result for `url` with the template narrative.
pub fn sample_result(url: &str, owner_id: Option<&str>) -> AnalysisResult {
    let url = Url::parse(url).expect("valid test url");
    let metrics = CarbonMetrics::from_page(650_000, false);
    AnalysisResult::new(
        &url,
        metrics,
        Narrative::fallback(&metrics),
        owner_id.map(str::to_string),
    )
}
