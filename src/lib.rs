//! eco_web_analyzer library: website carbon estimation and scoring
//!
//! Turns a URL into an estimate of the CO2 and energy cost of one page view,
//! a "cleaner than" percentile, an A-E grade and a short narrative with
//! improvement suggestions. Results are persisted append-only and served over
//! an HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use eco_web_analyzer::analysis::Analyzer;
//! use eco_web_analyzer::narrative::TemplateNarrator;
//! use eco_web_analyzer::provider::HeuristicProvider;
//! use eco_web_analyzer::storage::{init_memory_pool, run_migrations, SqliteAnalysisStore};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = init_memory_pool().await?;
//! run_migrations(&pool).await?;
//!
//! let analyzer = Analyzer::new(
//!     Arc::new(HeuristicProvider::offline()),
//!     Arc::new(TemplateNarrator),
//!     Arc::new(SqliteAnalysisStore::new(pool)),
//!     50,
//! );
//! let report = analyzer
//!     .analyze("example.com", None, &CancellationToken::new())
//!     .await?;
//! println!("{} g CO2, grade {}", report.result.co2_grams(), report.result.eco_score());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod analysis;
mod app;
pub mod config;
pub mod error_handling;
pub mod estimate;
pub mod initialization;
pub mod narrative;
pub mod provider;
pub mod security;
pub mod server;
pub mod storage;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

// Re-export public API
pub use analysis::{AnalysisReport, AnalysisResult, Analyzer, StoredAnalysis};
pub use app::{host_of, normalize_url};
pub use config::{Config, LogFormat, LogLevel};
pub use error_handling::AnalysisError;
pub use estimate::{CarbonMetrics, EcoScore};

/// Opens storage, wires the analyzer from `config` and serves the HTTP API
/// until Ctrl-C.
pub async fn run_server(config: Config) -> Result<()> {
    let client = initialization::init_client(&config).context("Failed to build HTTP client")?;

    let pool = storage::init_db_pool_with_path(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    storage::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    let store = Arc::new(storage::SqliteAnalysisStore::new(pool));

    let analyzer = Arc::new(Analyzer::from_config(&config, client, store));
    match analyzer.warm_cache().await {
        Ok(count) => info!("Loaded {count} recent analyses into cache"),
        Err(e) => warn!("Starting with an empty recent-analyses cache: {e}"),
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    server::start_server(&config.listen_addr, server::AppState::new(analyzer, shutdown)).await
}
