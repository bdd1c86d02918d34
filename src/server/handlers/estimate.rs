//! Offline estimate handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::Json;

use super::super::types::{ApiError, EstimateQuery, EstimateResponse};
use crate::estimate::CarbonMetrics;

/// `GET /api/estimate?bytes=N&green=true|false`
///
/// Scores a known page weight without any outbound call or persistence.
pub async fn estimate_handler(
    query: Result<Query<EstimateQuery>, QueryRejection>,
) -> Result<Json<EstimateResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let bytes = query
        .bytes
        .ok_or_else(|| ApiError::bad_request("Missing 'bytes' query parameter"))?;
    let metrics = CarbonMetrics::from_signed(bytes, query.green)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(EstimateResponse {
        eco_score: metrics.eco_score(),
        metrics,
    }))
}
