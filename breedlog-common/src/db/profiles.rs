//! Profile persistence
//!
//! Profiles are keyed by the authenticated user id and created on first
//! access. Only the owner's own row is ever read or written.

use serde::Deserialize;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::Profile;
use crate::time::{from_db_string, now, to_db_string};
use crate::{Error, Result};

#[derive(Debug, FromRow)]
struct ProfileRow {
    user_id: String,
    full_name: Option<String>,
    employee_id: Option<String>,
    designation: Option<String>,
    district: Option<String>,
    state: Option<String>,
    phone: Option<String>,
    is_verified: bool,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = Error;

    fn try_from(row: ProfileRow) -> Result<Self> {
        Ok(Profile {
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| Error::Internal(format!("Invalid stored user id: {}", e)))?,
            full_name: row.full_name,
            employee_id: row.employee_id,
            designation: row.designation,
            district: row.district,
            state: row.state,
            phone: row.phone,
            is_verified: row.is_verified,
            created_at: from_db_string(&row.created_at)?,
            updated_at: from_db_string(&row.updated_at)?,
        })
    }
}

/// Editable profile fields; the verified flag is deliberately absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub employee_id: Option<String>,
    pub designation: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
}

/// Create an empty profile for a first-time user; true when a row was added
pub async fn register(pool: &SqlitePool, user_id: Uuid) -> Result<bool> {
    let timestamp = to_db_string(now());
    let result = sqlx::query(
        "INSERT OR IGNORE INTO profiles (user_id, created_at, updated_at) VALUES (?, ?, ?)",
    )
    .bind(user_id.to_string())
    .bind(&timestamp)
    .bind(&timestamp)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load the user's profile, creating an empty one if absent
pub async fn ensure_profile(pool: &SqlitePool, user_id: Uuid) -> Result<Profile> {
    register(pool, user_id).await?;

    load(pool, user_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Profile for {} vanished after insert", user_id)))
}

async fn load(pool: &SqlitePool, user_id: Uuid) -> Result<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT user_id, full_name, employee_id, designation, district, state, phone,
               is_verified, created_at, updated_at
        FROM profiles WHERE user_id = ?
        "#,
    )
    .bind(user_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(Profile::try_from).transpose()
}

/// Update the caller's own profile
///
/// Blank strings clear a field. A duplicate employee id yields `Conflict`.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    changes: &ProfileChanges,
) -> Result<Profile> {
    ensure_profile(pool, user_id).await?;

    let fields = [
        ("full_name", &changes.full_name),
        ("employee_id", &changes.employee_id),
        ("designation", &changes.designation),
        ("district", &changes.district),
        ("state", &changes.state),
        ("phone", &changes.phone),
    ];

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE profiles SET updated_at = ");
    builder.push_bind(to_db_string(now()));
    for (column, value) in fields {
        if let Some(value) = value {
            let trimmed = value.trim();
            let stored = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
            builder.push(format!(", {} = ", column)).push_bind(stored);
        }
    }
    builder.push(" WHERE user_id = ").push_bind(user_id.to_string());

    builder
        .build()
        .execute(pool)
        .await
        .map_err(|e| Error::from_write(e, "employee_id is already registered to another profile"))?;

    load(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Profile for {} not found", user_id)))
}
