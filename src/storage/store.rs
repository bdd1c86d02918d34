//! The `AnalysisStore` seam and its SQLite implementation.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use sqlx::SqlitePool;

use super::insert::insert_analysis;
use super::queries::{fetch_recent_for_owner, fetch_recent_global};
use crate::analysis::{AnalysisResult, StoredAnalysis};
use crate::error_handling::DatabaseError;

/// Append-only persistence of analyses, read newest first.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persists `result`, returning it with its id and timestamp.
    async fn append(&self, result: &AnalysisResult) -> Result<StoredAnalysis, DatabaseError>;

    async fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredAnalysis>, DatabaseError>;

    async fn recent_global(&self, limit: usize) -> Result<Vec<StoredAnalysis>, DatabaseError>;
}

/// `AnalysisStore` over a SQLite pool with migrations applied.
#[derive(Clone)]
pub struct SqliteAnalysisStore {
    pool: Arc<SqlitePool>,
}

impl SqliteAnalysisStore {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for SqliteAnalysisStore {
    async fn append(&self, result: &AnalysisResult) -> Result<StoredAnalysis, DatabaseError> {
        let created_at_ms = chrono::Utc::now().timestamp_millis();
        let id = insert_analysis(&self.pool, result, created_at_ms).await?;
        debug!("Stored analysis {id} for {}", result.url());
        Ok(StoredAnalysis {
            id,
            created_at_ms,
            result: result.clone(),
        })
    }

    async fn recent_for_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<StoredAnalysis>, DatabaseError> {
        fetch_recent_for_owner(&self.pool, owner_id, limit).await
    }

    async fn recent_global(&self, limit: usize) -> Result<Vec<StoredAnalysis>, DatabaseError> {
        fetch_recent_global(&self.pool, limit).await
    }
}
