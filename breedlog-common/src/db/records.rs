//! Animal record persistence
//!
//! Ownership is enforced in SQL: every read and write binds the caller's
//! user id, so a record owned by someone else is indistinguishable from a
//! missing one.

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::breed_code::normalize_override;
use crate::db::prediction_logs;
use crate::models::{AnimalRecord, BreedPrediction, Species, VerificationStatus};
use crate::time::{from_db_string, now, to_db_string};
use crate::{Error, Result};

const RECORD_COLUMNS: &str = "id, user_id, animal_id, species, predicted_breed, manual_breed, \
     confidence_score, image_url, location_data, owner_details, verification_status, \
     verified_by, notes, created_at, updated_at";

/// Input for the classification upsert
#[derive(Debug, Clone)]
pub struct ClassificationWrite<'a> {
    pub user_id: Uuid,
    pub animal_id: &'a str,
    pub species: Species,
    pub top: &'a BreedPrediction,
    pub image_url: &'a str,
}

/// Result of the classification upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub record_id: Uuid,
    /// False when an existing (animal_id, user_id) row was overwritten
    pub created: bool,
}

/// Insert-or-update keyed by (animal_id, user_id) in one statement
///
/// New rows start as `pending`. Existing rows keep their status, overrides,
/// notes and creation time; the prediction columns and image reference are
/// replaced by the latest classification.
pub async fn upsert_classification(
    pool: &SqlitePool,
    write: &ClassificationWrite<'_>,
) -> Result<UpsertOutcome> {
    let candidate_id = Uuid::new_v4();
    let timestamp = to_db_string(now());

    let stored_id: String = sqlx::query_scalar(
        r#"
        INSERT INTO animal_records
            (id, user_id, animal_id, species, predicted_breed, confidence_score, image_url,
             verification_status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
        ON CONFLICT(animal_id, user_id) DO UPDATE SET
            species = excluded.species,
            predicted_breed = excluded.predicted_breed,
            confidence_score = excluded.confidence_score,
            image_url = excluded.image_url,
            updated_at = excluded.updated_at
        RETURNING id
        "#,
    )
    .bind(candidate_id.to_string())
    .bind(write.user_id.to_string())
    .bind(write.animal_id)
    .bind(write.species.as_str())
    .bind(&write.top.breed)
    .bind(write.top.confidence)
    .bind(write.image_url)
    .bind(&timestamp)
    .bind(&timestamp)
    .fetch_one(pool)
    .await?;

    let record_id = parse_uuid(&stored_id)?;
    Ok(UpsertOutcome {
        record_id,
        created: record_id == candidate_id,
    })
}

/// Filters and page window for listing a user's records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter {
    pub status: Option<VerificationStatus>,
    pub species: Option<Species>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of records plus the unpaged total
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<AnimalRecord>,
    pub total: i64,
}

/// List the owner's records newest first, each with its prediction history
pub async fn list_for_owner(
    pool: &SqlitePool,
    owner: Uuid,
    filter: &RecordFilter,
) -> Result<RecordPage> {
    let owner_str = owner.to_string();
    let status = filter.status.map(|s| s.as_str());
    let species = filter.species.map(|s| s.as_str());

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM animal_records
        WHERE user_id = ?
          AND (? IS NULL OR verification_status = ?)
          AND (? IS NULL OR species = ?)
        "#,
    )
    .bind(&owner_str)
    .bind(status)
    .bind(status)
    .bind(species)
    .bind(species)
    .fetch_one(pool)
    .await?;

    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS} FROM animal_records
        WHERE user_id = ?
          AND (? IS NULL OR verification_status = ?)
          AND (? IS NULL OR species = ?)
        ORDER BY created_at DESC, rowid DESC
        LIMIT ? OFFSET ?
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(&owner_str)
        .bind(status)
        .bind(status)
        .bind(species)
        .bind(species)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;

    let mut records = rows.iter().map(record_from_row).collect::<Result<Vec<_>>>()?;
    attach_logs(pool, &mut records).await?;

    debug!(
        "Listed {} of {} records for user {}",
        records.len(),
        total,
        owner
    );

    Ok(RecordPage { records, total })
}

/// Fetch one owned record with its prediction history
pub async fn get_for_owner(
    pool: &SqlitePool,
    record_id: Uuid,
    owner: Uuid,
) -> Result<Option<AnimalRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM animal_records WHERE id = ? AND user_id = ?");
    let row = sqlx::query(&sql)
        .bind(record_id.to_string())
        .bind(owner.to_string())
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let mut records = vec![record_from_row(&row)?];
    attach_logs(pool, &mut records).await?;
    Ok(records.pop())
}

/// Field-level changes accepted by the update surface
///
/// Breed text is raw user input; it is normalized before storage. An empty
/// breed string clears the manual override.
#[derive(Debug, Clone, Default)]
pub struct RecordChanges {
    pub manual_breed: Option<String>,
    /// Written as the manual override; `manual_breed` wins when both are given
    pub final_breed: Option<String>,
    pub verification_status: Option<VerificationStatus>,
    pub notes: Option<String>,
    pub location_data: Option<Value>,
    pub owner_details: Option<Value>,
}

impl RecordChanges {
    pub fn is_empty(&self) -> bool {
        self.manual_breed.is_none()
            && self.final_breed.is_none()
            && self.verification_status.is_none()
            && self.notes.is_none()
            && self.location_data.is_none()
            && self.owner_details.is_none()
    }

    fn breed_override(&self) -> Option<Option<String>> {
        self.manual_breed
            .as_deref()
            .or(self.final_breed.as_deref())
            .map(normalize_override)
    }
}

/// Apply changes to a record owned by `owner`, returning the updated record
///
/// Fails with `NotFound` when the record is absent or owned by someone else
/// and with `InvalidInput` when the status change would reopen a review.
pub async fn update_for_owner(
    pool: &SqlitePool,
    record_id: Uuid,
    owner: Uuid,
    changes: &RecordChanges,
) -> Result<AnimalRecord> {
    let current: Option<String> = sqlx::query_scalar(
        "SELECT verification_status FROM animal_records WHERE id = ? AND user_id = ?",
    )
    .bind(record_id.to_string())
    .bind(owner.to_string())
    .fetch_optional(pool)
    .await?;

    let Some(current) = current else {
        return Err(Error::NotFound(format!("Record {} not found", record_id)));
    };

    apply_changes(pool, record_id, owner, current.parse()?, changes).await?;

    get_for_owner(pool, record_id, owner)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Record {} not found", record_id)))
}

/// Single guarded UPDATE against the status read as `current`
///
/// The write only lands while the stored status still equals `current`, so
/// the transition check cannot be bypassed by a concurrent review. A lost race
/// surfaces as `Conflict`.
pub async fn apply_changes(
    pool: &SqlitePool,
    record_id: Uuid,
    owner: Uuid,
    current: VerificationStatus,
    changes: &RecordChanges,
) -> Result<()> {
    let owner_str = owner.to_string();

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE animal_records SET updated_at = ");
    builder.push_bind(to_db_string(now()));
    let mut changed = false;

    if let Some(breed) = changes.breed_override() {
        builder.push(", manual_breed = ").push_bind(breed);
        changed = true;
    }

    if let Some(next) = changes.verification_status {
        if !current.can_transition_to(next) {
            return Err(Error::InvalidInput(format!(
                "Cannot change verification_status from {} to {}",
                current, next
            )));
        }
        if next != current {
            builder.push(", verification_status = ").push_bind(next.as_str());
            changed = true;
        }
        if next.stamps_verifier() {
            builder.push(", verified_by = ").push_bind(owner_str.clone());
            changed = true;
        }
    }

    if let Some(notes) = &changes.notes {
        builder.push(", notes = ").push_bind(notes.clone());
        changed = true;
    }

    if let Some(location) = &changes.location_data {
        builder.push(", location_data = ").push_bind(location.to_string());
        changed = true;
    }

    if let Some(owner_details) = &changes.owner_details {
        builder.push(", owner_details = ").push_bind(owner_details.to_string());
        changed = true;
    }

    if !changed {
        return Ok(());
    }

    builder
        .push(" WHERE id = ")
        .push_bind(record_id.to_string())
        .push(" AND user_id = ")
        .push_bind(owner_str)
        .push(" AND verification_status = ")
        .push_bind(current.as_str());
    let result = builder.build().execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Record {} changed during update, retry",
            record_id
        )));
    }
    Ok(())
}

async fn attach_logs(pool: &SqlitePool, records: &mut [AnimalRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
    let mut logs: HashMap<Uuid, _> = prediction_logs::list_for_records(pool, &ids).await?;
    for record in records.iter_mut() {
        record.prediction_logs = logs.remove(&record.id).unwrap_or_default();
    }
    Ok(())
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid stored id '{}': {}", value, e)))
}

fn parse_json(value: Option<String>) -> Result<Option<Value>> {
    value
        .map(|text| {
            serde_json::from_str(&text)
                .map_err(|e| Error::Internal(format!("Corrupt JSON column: {}", e)))
        })
        .transpose()
}

fn record_from_row(row: &SqliteRow) -> Result<AnimalRecord> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let species: String = row.get("species");
    let status: String = row.get("verification_status");
    let verified_by: Option<String> = row.get("verified_by");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(AnimalRecord {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        animal_id: row.get("animal_id"),
        species: species.parse()?,
        predicted_breed: row.get("predicted_breed"),
        manual_breed: row.get("manual_breed"),
        confidence_score: row.get("confidence_score"),
        image_url: row.get("image_url"),
        location_data: parse_json(row.get("location_data"))?,
        owner_details: parse_json(row.get("owner_details"))?,
        verification_status: status.parse()?,
        verified_by: verified_by.as_deref().map(parse_uuid).transpose()?,
        notes: row.get("notes"),
        created_at: from_db_string(&created_at)?,
        updated_at: from_db_string(&updated_at)?,
        prediction_logs: Vec::new(),
    })
}
