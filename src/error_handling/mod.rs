//! Error handling and processing statistics.
//!
//! This module provides:
//! - The error taxonomy (`AnalysisError`, `UpstreamError`, `DatabaseError`, ...)
//! - Processing statistics (completed analyses, errors, upstream fallbacks)
//! - Retry strategy configuration and upstream error categorization

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, get_retry_strategy};
pub use stats::ProcessingStats;
pub use types::{
    AnalysisError, DatabaseError, ErrorType, FallbackType, InitializationError, UpstreamError,
};
