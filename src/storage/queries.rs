//! Newest-first reads of stored analyses.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::analysis::{AnalysisResult, StoredAnalysis};
use crate::error_handling::DatabaseError;
use crate::estimate::CarbonMetrics;

const SELECT_COLUMNS: &str = "SELECT id, url, owner_id, bytes, green, co2_grams, energy_wh, \
     cleaner_than_percent, ai_summary, suggestions_json, created_at_ms FROM analyses";

/// Most recent analyses attributed to `owner_id`, newest first.
pub async fn fetch_recent_for_owner(
    pool: &SqlitePool,
    owner_id: &str,
    limit: usize,
) -> Result<Vec<StoredAnalysis>, DatabaseError> {
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} WHERE owner_id = ? ORDER BY created_at_ms DESC, id DESC LIMIT ?"
    ))
    .bind(owner_id)
    .bind(limit_param(limit))
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_stored).collect()
}

/// Most recent analyses across all owners, newest first.
pub async fn fetch_recent_global(
    pool: &SqlitePool,
    limit: usize,
) -> Result<Vec<StoredAnalysis>, DatabaseError> {
    let rows = sqlx::query(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at_ms DESC, id DESC LIMIT ?"
    ))
    .bind(limit_param(limit))
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_stored).collect()
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Maps a row back to a result. The stored `eco_score` column is ignored and
/// the grade re-derived from the percentile.
fn row_to_stored(row: &SqliteRow) -> Result<StoredAnalysis, DatabaseError> {
    let id: i64 = row.try_get("id")?;
    let corrupt = |reason: String| DatabaseError::CorruptRow { id, reason };

    let bytes: i64 = row.try_get("bytes")?;
    let bytes = u64::try_from(bytes).map_err(|_| corrupt(format!("negative bytes {bytes}")))?;

    let percent: i64 = row.try_get("cleaner_than_percent")?;
    let cleaner_than_percent = u8::try_from(percent)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| corrupt(format!("percentile {percent} out of range")))?;

    let suggestions_json: String = row.try_get("suggestions_json")?;
    let suggestions: Vec<String> = serde_json::from_str(&suggestions_json)
        .map_err(|e| corrupt(format!("invalid suggestions_json: {e}")))?;

    let metrics = CarbonMetrics {
        bytes,
        green: row.try_get("green")?,
        co2_grams: row.try_get("co2_grams")?,
        energy_wh: row.try_get("energy_wh")?,
        cleaner_than_percent,
    };

    Ok(StoredAnalysis {
        id,
        created_at_ms: row.try_get("created_at_ms")?,
        result: AnalysisResult::restore(
            row.try_get("url")?,
            metrics,
            row.try_get("ai_summary")?,
            suggestions,
            row.try_get("owner_id")?,
        ),
    })
}
