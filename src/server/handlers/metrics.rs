//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use strum::IntoEnumIterator;

use super::super::types::AppState;
use crate::error_handling::{ErrorType, FallbackType, ProcessingStats};

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    let body = render_metrics(
        state.analyzer.stats(),
        state.start_time.elapsed().as_secs_f64(),
    );
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

fn render_metrics(stats: &ProcessingStats, uptime_seconds: f64) -> String {
    let mut out = format!(
        r#"# HELP eco_web_analyzer_analyses_completed_total Analyses returned to callers
# TYPE eco_web_analyzer_analyses_completed_total counter
eco_web_analyzer_analyses_completed_total {}

# HELP eco_web_analyzer_analyses_unsaved_total Analyses returned without being persisted
# TYPE eco_web_analyzer_analyses_unsaved_total counter
eco_web_analyzer_analyses_unsaved_total {}

# HELP eco_web_analyzer_uptime_seconds Seconds since the server started
# TYPE eco_web_analyzer_uptime_seconds gauge
eco_web_analyzer_uptime_seconds {}

# HELP eco_web_analyzer_errors_total Analyses that ended in an error, by type
# TYPE eco_web_analyzer_errors_total counter
"#,
        stats.completed(),
        stats.unsaved(),
        uptime_seconds,
    );

    // Writing to a String cannot fail.
    for error in ErrorType::iter() {
        let _ = writeln!(
            out,
            "eco_web_analyzer_errors_total{{type=\"{error}\"}} {}",
            stats.get_error_count(error)
        );
    }

    out.push_str(
        "\n# HELP eco_web_analyzer_fallbacks_total Upstream calls replaced by a local rule\n\
         # TYPE eco_web_analyzer_fallbacks_total counter\n",
    );
    for fallback in FallbackType::iter() {
        let _ = writeln!(
            out,
            "eco_web_analyzer_fallbacks_total{{upstream=\"{fallback}\"}} {}",
            stats.get_fallback_count(fallback)
        );
    }
    out
}
