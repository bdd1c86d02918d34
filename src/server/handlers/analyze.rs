//! Analysis handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::super::types::{owner_from, AnalyzeQuery, AnalyzeRequest, ApiError, AppState};
use crate::analysis::AnalysisReport;
use crate::error_handling::AnalysisError;

/// `POST /api/analyze` with `{ "url": ... }`
pub async fn analyze_post_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    run_analysis(&state, &request.url, &headers).await
}

/// `GET /api/analyze?url=...`
pub async fn analyze_get_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let url = query
        .url
        .ok_or_else(|| ApiError::bad_request("Missing 'url' query parameter"))?;
    run_analysis(&state, &url, &headers).await
}

async fn run_analysis(
    state: &AppState,
    url: &str,
    headers: &HeaderMap,
) -> Result<Json<AnalysisReport>, ApiError> {
    // Client disconnects drop this future, which abandons the analysis.
    let cancel = state.shutdown.child_token();
    state
        .analyzer
        .analyze(url, owner_from(headers), &cancel)
        .await
        .map(Json)
        .map_err(api_error)
}

fn api_error(error: AnalysisError) -> ApiError {
    let status = match error {
        AnalysisError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        AnalysisError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Persistence(_) | AnalysisError::Failed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiError::new(status, error.to_string())
}
