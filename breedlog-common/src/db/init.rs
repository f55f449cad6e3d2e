//! Database initialization
//!
//! Opens (or creates) the SQLite database, applies connection pragmas through
//! the connect options so every pooled connection gets them, then creates the
//! schema idempotently and seeds the breed catalog.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Single connection: every pooled connection to `:memory:` would otherwise
/// see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables and seed reference data (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_breeds_table(pool).await?;
    create_profiles_table(pool).await?;
    create_animal_records_table(pool).await?;
    create_prediction_logs_table(pool).await?;

    let seeded = crate::db::breeds::seed_breeds(pool).await?;
    if seeded > 0 {
        info!("Seeded {} breed catalog rows", seeded);
    }

    Ok(())
}

async fn create_breeds_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS breeds (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            breed_code TEXT NOT NULL UNIQUE,
            species TEXT NOT NULL CHECK (species IN ('cattle', 'buffalo')),
            description TEXT,
            characteristics TEXT NOT NULL DEFAULT '{}',
            native_region TEXT,
            is_indigenous INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_breeds_species_name ON breeds(species, name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_profiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            full_name TEXT,
            employee_id TEXT UNIQUE,
            designation TEXT,
            district TEXT,
            state TEXT,
            phone TEXT,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `final_breed` has no column: it is derived from manual/predicted on read.
async fn create_animal_records_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS animal_records (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            animal_id TEXT NOT NULL,
            species TEXT NOT NULL CHECK (species IN ('cattle', 'buffalo')),
            predicted_breed TEXT,
            manual_breed TEXT,
            confidence_score REAL CHECK (confidence_score IS NULL OR (confidence_score >= 0 AND confidence_score <= 1)),
            image_url TEXT,
            location_data TEXT,
            owner_details TEXT,
            verification_status TEXT NOT NULL DEFAULT 'pending'
                CHECK (verification_status IN ('pending', 'verified', 'rejected')),
            verified_by TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (animal_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_animal_records_user_created ON animal_records(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_prediction_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prediction_logs (
            id TEXT PRIMARY KEY,
            record_id TEXT NOT NULL REFERENCES animal_records(id) ON DELETE CASCADE,
            predictions TEXT NOT NULL,
            model_version TEXT NOT NULL,
            processing_time_ms INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_prediction_logs_record ON prediction_logs(record_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
