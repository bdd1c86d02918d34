//! HTTP API server.
//!
//! Routes:
//! - `POST /api/analyze`, `GET /api/analyze?url=` - run an analysis
//! - `GET /api/estimate?bytes=&green=` - score a known page weight offline
//! - `GET /api/analyses/recent` - latest analyses across owners
//! - `GET /api/analyses/mine` - latest analyses for the `X-Owner-Id` header
//! - `POST /api/ask` - sustainability Q&A
//! - `/metrics` - Prometheus-compatible metrics
//! - `/status` - JSON processing counters

mod handlers;
mod types;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use handlers::{
    analyze_get_handler, analyze_post_handler, ask_handler, estimate_handler, metrics_handler,
    mine_handler, recent_handler, status_handler,
};
pub use types::{ApiError, AppState};

/// Builds the router with all routes and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/analyze",
            get(analyze_get_handler).post(analyze_post_handler),
        )
        .route("/api/estimate", get(estimate_handler))
        .route("/api/analyses/recent", get(recent_handler))
        .route("/api/analyses/mine", get(mine_handler))
        .route("/api/ask", post(ask_handler))
        .route("/metrics", get(metrics_handler))
        .route("/status", get(status_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until the state's shutdown token is cancelled.
pub async fn start_server(addr: &str, state: AppState) -> Result<(), anyhow::Error> {
    let shutdown = state.shutdown.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind server to {}: {}", addr, e))?;
    let local = listener.local_addr()?;

    log::info!("Listening on http://{}/", local);
    log::info!("  - Analyze: http://{}/api/analyze", local);
    log::info!("  - Metrics: http://{}/metrics", local);
    log::info!("  - Status: http://{}/status", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    log::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    use crate::analysis::Analyzer;
    use crate::narrative::TemplateNarrator;
    use crate::provider::HeuristicProvider;
    use crate::storage::test_helpers::create_test_pool;
    use crate::storage::SqliteAnalysisStore;

    async fn test_state() -> AppState {
        let store = SqliteAnalysisStore::new(Arc::new(create_test_pool().await));
        let analyzer = Analyzer::new(
            Arc::new(HeuristicProvider::offline()),
            Arc::new(TemplateNarrator),
            Arc::new(store),
            10,
        );
        AppState::new(Arc::new(analyzer), CancellationToken::new())
    }

    #[tokio::test]
    async fn test_start_server_bind_failure() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = occupied.local_addr().unwrap().to_string();

        let err = start_server(&addr, test_state().await).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind server"));
    }

    #[tokio::test]
    async fn test_start_server_stops_on_shutdown() {
        let state = test_state().await;
        let shutdown = state.shutdown.clone();
        let server = tokio::spawn(async move { start_server("127.0.0.1:0", state).await });

        shutdown.cancel();
        let outcome = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .expect("server task panicked");
        assert!(outcome.is_ok());
    }
}
