//! Database layer
//!
//! SQLite-backed storage for inventories, their catalog relations, user
//! accounts, and the audit log. Repositories follow the one-struct-per-concern
//! pattern and borrow the shared pool.

pub mod audit_repository;
pub mod inventory_repository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

pub use audit_repository::AuditRepository;
pub use inventory_repository::{InventoryRepository, SqlEntityStore};

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool and run migrations
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", config.url))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(pool)
}

/// Parse a timestamp column written either as RFC 3339 or as the bare
/// `YYYY-MM-DD HH:MM:SS` form SQLite defaults produce.
pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}
