use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::domain::error::{AppError, Result};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS data_sources (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        file_path TEXT NOT NULL,
        file_type TEXT NOT NULL,
        columns_json TEXT NOT NULL DEFAULT '[]',
        user_id TEXT NOT NULL,
        created_at DATETIME NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_data_sources_user ON data_sources(user_id)",
    "CREATE TABLE IF NOT EXISTS reports (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        data_sources_json TEXT NOT NULL DEFAULT '[]',
        visualizations_json TEXT NOT NULL DEFAULT '[]',
        narratives_json TEXT NOT NULL DEFAULT '[]',
        user_id TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        last_updated DATETIME NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_reports_user ON reports(user_id)",
];

/// Open (creating if missing) the SQLite database and apply the schema.
///
/// In-memory URLs get a single connection so every query sees the same
/// database.
pub async fn connect_pool(database_url: &str) -> Result<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
        })?
        .create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 5 })
        .acquire_timeout(Duration::from_secs(10));
    if in_memory {
        // Dropping the only connection would drop the database with it
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

    apply_schema(&pool).await?;
    info!(database_url, "Database ready");

    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema: {}", e)))?;
    }
    Ok(())
}
