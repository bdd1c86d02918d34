//! Database insert operations.
//!
//! Analyses are append-only: this is the only write path, and rows are never
//! updated or deleted.

use sqlx::{Row, SqlitePool};

use crate::analysis::AnalysisResult;
use crate::error_handling::DatabaseError;

/// Inserts one analysis and returns its row id.
pub async fn insert_analysis(
    pool: &SqlitePool,
    result: &AnalysisResult,
    created_at_ms: i64,
) -> Result<i64, DatabaseError> {
    let bytes = i64::try_from(result.bytes()).map_err(|_| DatabaseError::CorruptRow {
        id: 0,
        reason: format!("byte count {} exceeds storage range", result.bytes()),
    })?;
    let suggestions_json = serde_json::to_string(result.suggestions()).map_err(|e| {
        DatabaseError::CorruptRow {
            id: 0,
            reason: format!("unserializable suggestions: {e}"),
        }
    })?;

    let row = sqlx::query(
        "INSERT INTO analyses (
            url, owner_id, bytes, green, co2_grams, energy_wh,
            cleaner_than_percent, eco_score, ai_summary, suggestions_json, created_at_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id",
    )
    .bind(result.url())
    .bind(result.owner_id())
    .bind(bytes)
    .bind(result.green())
    .bind(result.co2_grams())
    .bind(result.energy_wh())
    .bind(i64::from(result.cleaner_than_percent()))
    .bind(result.eco_score().to_string())
    .bind(result.ai_summary())
    .bind(suggestions_json)
    .bind(created_at_ms)
    .fetch_one(pool)
    .await?;

    Ok(row.get::<i64, _>("id"))
}
