//! Analysis history handlers.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use log::error;

use super::super::types::{owner_from, ApiError, AppState, HistoryQuery};
use crate::analysis::StoredAnalysis;
use crate::config::{GLOBAL_HISTORY_LIMIT, MAX_HISTORY_LIMIT, OWNER_HISTORY_LIMIT};
use crate::error_handling::DatabaseError;

/// `GET /api/analyses/recent?limit=N`
pub async fn recent_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredAnalysis>>, ApiError> {
    let limit = effective_limit(query.limit, GLOBAL_HISTORY_LIMIT);
    state
        .analyzer
        .recent_global(limit)
        .await
        .map(Json)
        .map_err(history_error)
}

/// `GET /api/analyses/mine?limit=N`, keyed by the `X-Owner-Id` header
pub async fn mine_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<StoredAnalysis>>, ApiError> {
    let Some(owner) = owner_from(&headers) else {
        return Ok(Json(Vec::new()));
    };
    let limit = effective_limit(query.limit, OWNER_HISTORY_LIMIT);
    state
        .analyzer
        .recent_for_owner(&owner, limit)
        .await
        .map(Json)
        .map_err(history_error)
}

fn effective_limit(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(1, MAX_HISTORY_LIMIT)
}

fn history_error(e: DatabaseError) -> ApiError {
    error!("Failed to read analysis history: {e}");
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to read analysis history",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(None, 5), 5);
        assert_eq!(effective_limit(Some(0), 5), 1);
        assert_eq!(effective_limit(Some(20), 5), 20);
        assert_eq!(effective_limit(Some(10_000), 5), MAX_HISTORY_LIMIT);
    }
}
