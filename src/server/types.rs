//! Server state, request bodies and response payloads.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::analysis::Analyzer;
use crate::config::OWNER_ID_HEADER;
use crate::estimate::{CarbonMetrics, EcoScore};

/// Shared state for all routes
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub start_time: Arc<Instant>,
    /// Cancelled on shutdown; in-flight analyses observe it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, shutdown: CancellationToken) -> Self {
        Self {
            analyzer,
            start_time: Arc::new(Instant::now()),
            shutdown,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub bytes: Option<i64>,
    #[serde(default)]
    pub green: bool,
}

/// Metrics and grade for a caller-supplied page weight.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub metrics: CarbonMetrics,
    pub eco_score: EcoScore,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    pub uptime_seconds: f64,
    pub completed_analyses: usize,
    pub unsaved_analyses: usize,
    pub cached_analyses: usize,
    pub errors: CounterGroup,
    pub fallbacks: CounterGroup,
}

#[derive(Serialize)]
pub struct CounterGroup {
    pub total: usize,
    pub by_type: BTreeMap<&'static str, usize>,
}

/// A status code with a `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Owner id from the `X-Owner-Id` header, if present and non-blank.
pub fn owner_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(OWNER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|owner| !owner.is_empty())
        .map(str::to_string)
}
