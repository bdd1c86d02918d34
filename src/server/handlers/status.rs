//! JSON status handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::{AppState, CounterGroup, StatusResponse};
use crate::error_handling::{ErrorType, FallbackType};

/// JSON status endpoint with the processing counters
pub async fn status_handler(State(state): State<AppState>) -> Response {
    let stats = state.analyzer.stats();

    let response = StatusResponse {
        uptime_seconds: state.start_time.elapsed().as_secs_f64(),
        completed_analyses: stats.completed(),
        unsaved_analyses: stats.unsaved(),
        cached_analyses: state.analyzer.cache().len(),
        errors: CounterGroup {
            total: stats.total_errors(),
            by_type: ErrorType::iter()
                .map(|e| (e.as_str(), stats.get_error_count(e)))
                .collect(),
        },
        fallbacks: CounterGroup {
            total: stats.total_fallbacks(),
            by_type: FallbackType::iter()
                .map(|f| (f.as_str(), stats.get_fallback_count(f)))
                .collect(),
        },
    };

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}
