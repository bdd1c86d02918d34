//! Sustainability Q&A handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use log::warn;

use super::super::types::{ApiError, AppState, AskRequest, AskResponse};

/// `POST /api/ask` with `{ "question": ... }`
pub async fn ask_handler(
    State(state): State<AppState>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("Question cannot be empty"));
    }

    match state.analyzer.ask(question).await {
        Ok(answer) => Ok(Json(AskResponse { answer })),
        Err(e) => {
            warn!("Question could not be answered: {e}");
            Err(ApiError::new(
                StatusCode::BAD_GATEWAY,
                format!("Failed to get an answer: {e}"),
            ))
        }
    }
}
