//! Prediction log persistence (append-only)

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{BreedPrediction, PredictionLogEntry};
use crate::time::{from_db_string, now, to_db_string};
use crate::{Error, Result};

/// Append one classification attempt for `record_id`
pub async fn insert_log(
    pool: &SqlitePool,
    record_id: Uuid,
    predictions: &[BreedPrediction],
    model_version: &str,
    processing_time_ms: u64,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let predictions_json = serde_json::to_string(predictions)
        .map_err(|e| Error::Internal(format!("Failed to encode predictions: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO prediction_logs (id, record_id, predictions, model_version, processing_time_ms, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(record_id.to_string())
    .bind(predictions_json)
    .bind(model_version)
    .bind(i64::try_from(processing_time_ms).unwrap_or(i64::MAX))
    .bind(to_db_string(now()))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Load history for several records at once, newest entry first per record
pub async fn list_for_records(
    pool: &SqlitePool,
    record_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<PredictionLogEntry>>> {
    let mut grouped: HashMap<Uuid, Vec<PredictionLogEntry>> = HashMap::new();
    if record_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT id, record_id, predictions, model_version, processing_time_ms, created_at \
         FROM prediction_logs WHERE record_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in record_ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(") ORDER BY created_at DESC, rowid DESC");

    let rows = builder.build().fetch_all(pool).await?;

    for row in rows {
        let entry = entry_from_row(&row)?;
        grouped.entry(entry.record_id).or_default().push(entry);
    }

    Ok(grouped)
}

/// Number of attempts logged for one record
pub async fn count_for_record(pool: &SqlitePool, record_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prediction_logs WHERE record_id = ?")
        .bind(record_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PredictionLogEntry> {
    let id: String = row.get("id");
    let record_id: String = row.get("record_id");
    let predictions: String = row.get("predictions");
    let created_at: String = row.get("created_at");

    let parse = |s: &str| {
        Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid stored id '{}': {}", s, e)))
    };

    Ok(PredictionLogEntry {
        id: parse(&id)?,
        record_id: parse(&record_id)?,
        predictions: serde_json::from_str(&predictions)
            .map_err(|e| Error::Internal(format!("Corrupt prediction list: {}", e)))?,
        model_version: row.get("model_version"),
        processing_time_ms: row.get("processing_time_ms"),
        created_at: from_db_string(&created_at)?,
    })
}
