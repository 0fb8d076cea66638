//! Database initialization
//!
//! Creates the database on first run and brings the schema up idempotently.
//! All statements use CREATE TABLE IF NOT EXISTS, so init is safe to call on
//! every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys (ratings/items cascade with their project)
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers while a submission commits
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_settings_table(&pool).await?;
    create_projects_table(&pool).await?;
    create_criteria_table(&pool).await?;
    create_scale_items_table(&pool).await?;
    create_responses_table(&pool).await?;
    create_ratings_table(&pool).await?;

    Ok(pool)
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_projects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS projects (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL CHECK (kind IN ('delphi', 'face-validity')),
            owner TEXT NOT NULL,
            invite_token TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_criteria_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS criteria (
            project_guid TEXT NOT NULL REFERENCES projects(guid) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            label TEXT NOT NULL,
            PRIMARY KEY (project_guid, position)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_scale_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS scale_items (
            guid TEXT PRIMARY KEY,
            project_guid TEXT NOT NULL REFERENCES projects(guid) ON DELETE CASCADE,
            side TEXT NOT NULL CHECK (side IN ('original', 'translated')),
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            UNIQUE (project_guid, side, position)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_responses_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE(project_guid, expert_email) enforces one submission per expert;
    // a second submission is rejected at intake, never merged
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS responses (
            guid TEXT PRIMARY KEY,
            project_guid TEXT NOT NULL REFERENCES projects(guid) ON DELETE CASCADE,
            expert_name TEXT NOT NULL,
            expert_email TEXT NOT NULL,
            qualification TEXT NOT NULL DEFAULT '',
            years_experience TEXT NOT NULL DEFAULT '',
            remarks TEXT,
            submitted_at TEXT NOT NULL,
            UNIQUE (project_guid, expert_email)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ratings (
            response_guid TEXT NOT NULL REFERENCES responses(guid) ON DELETE CASCADE,
            item_index INTEGER NOT NULL,
            criterion_index INTEGER NOT NULL,
            value INTEGER NOT NULL,
            PRIMARY KEY (response_guid, item_index, criterion_index)
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
