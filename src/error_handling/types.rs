//! Error type definitions.
//!
//! This module defines the error taxonomy of the service and the counter
//! categories tracked by `ProcessingStats`.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be turned back into an analysis.
    #[error("Corrupt analysis row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },
}

/// Failure of an advisory upstream call.
///
/// These never reach the caller of an analysis: every call site that can
/// produce one has a local fallback.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network-level failure (connect, timeout, TLS, body read).
    #[error("{service} unreachable: {source}")]
    Unavailable {
        service: &'static str,
        #[source]
        source: ReqwestError,
    },

    /// The upstream answered with a non-success status.
    #[error("{service} returned HTTP {status}")]
    BadStatus { service: &'static str, status: u16 },

    /// The upstream answered, but the payload is unusable.
    #[error("{service} returned an invalid payload: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    /// The call was skipped because the service is not configured.
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },
}

impl UpstreamError {
    /// Whether a second attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Unavailable { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            UpstreamError::BadStatus { status, .. } => {
                *status == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS || *status >= 500
            }
            UpstreamError::Malformed { .. } | UpstreamError::NotConfigured { .. } => false,
        }
    }
}

/// Errors surfaced to the caller of an analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The submitted URL cannot be analyzed. Raised before any outbound call.
    #[error("Invalid URL '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// Writing the record failed.
    #[error("Failed to save analysis: {0}")]
    Persistence(#[from] DatabaseError),

    /// The initiating request was cancelled; nothing was persisted.
    #[error("Analysis cancelled")]
    Cancelled,

    /// Any other failure, reduced to its message.
    #[error("Failed to analyze website: {0}")]
    Failed(String),
}

impl AnalysisError {
    pub(crate) fn invalid_input(input: &str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures counted by `ProcessingStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    InvalidInput,
    PersistenceFailed,
    Cancelled,
    AnalysisFailed,
}

/// Upstream calls that fell back to a local rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FallbackType {
    /// External carbon API failed; internal chain used
    CarbonApi,
    /// Green registry failed; allowlist verdict used
    GreenRegistry,
    /// HEAD probe failed or had no Content-Length; hostname table used
    ByteProbe,
    /// Narrative model failed or produced nothing usable; template used
    NarrativeModel,
    /// Analysis outran its deadline; offline heuristic and template used
    AnalysisDeadline,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::InvalidInput => "invalid_input",
            ErrorType::PersistenceFailed => "persistence_failed",
            ErrorType::Cancelled => "cancelled",
            ErrorType::AnalysisFailed => "analysis_failed",
        }
    }
}

impl std::fmt::Display for FallbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FallbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackType::CarbonApi => "carbon_api",
            FallbackType::GreenRegistry => "green_registry",
            FallbackType::ByteProbe => "byte_probe",
            FallbackType::NarrativeModel => "narrative_model",
            FallbackType::AnalysisDeadline => "analysis_deadline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str_unique() {
        let names: std::collections::HashSet<_> = ErrorType::iter().map(|e| e.as_str()).collect();
        assert_eq!(names.len(), ErrorType::iter().count());
    }

    #[test]
    fn test_fallback_type_display() {
        assert_eq!(FallbackType::CarbonApi.to_string(), "carbon_api");
        assert_eq!(FallbackType::NarrativeModel.to_string(), "narrative_model");
    }

    #[test]
    fn test_upstream_bad_status_transience() {
        let server_error = UpstreamError::BadStatus {
            service: "test",
            status: 503,
        };
        let rate_limited = UpstreamError::BadStatus {
            service: "test",
            status: 429,
        };
        let not_found = UpstreamError::BadStatus {
            service: "test",
            status: 404,
        };
        assert!(server_error.is_transient());
        assert!(rate_limited.is_transient());
        assert!(!not_found.is_transient());
    }

    #[test]
    fn test_upstream_malformed_not_transient() {
        let err = UpstreamError::Malformed {
            service: "test",
            reason: "missing field".into(),
        };
        assert!(!err.is_transient());
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_analysis_error_messages() {
        let err = AnalysisError::invalid_input("not a url", "invalid domain character");
        assert_eq!(
            err.to_string(),
            "Invalid URL 'not a url': invalid domain character"
        );
        let err = AnalysisError::Failed("boom".into());
        assert_eq!(err.to_string(), "Failed to analyze website: boom");
    }

    #[test]
    fn test_persistence_error_wraps_database_error() {
        let err = AnalysisError::from(DatabaseError::FileCreationError("disk full".into()));
        assert!(matches!(err, AnalysisError::Persistence(_)));
        assert_eq!(
            err.to_string(),
            "Failed to save analysis: Database file creation error: disk full"
        );
    }
}
