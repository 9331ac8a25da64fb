//! SQLite persistence layer.
//!
//! Wraps a `sqlx` pool, applies inline migrations tracked in a
//! `schema_version` table, and exposes per-entity repositories.

mod patch;
mod schedule;
mod user;
mod vehicle;

pub use patch::Patch;
pub use schedule::{NewScheduleItem, ScheduleItem, ScheduleItemUpdate, ScheduleRepository};
pub use user::{User, UserRepository, UserUpdate};
pub use vehicle::{NewVehicle, Vehicle, VehicleRepository, VehicleUpdate};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::{debug, info};

/// Persistence errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("user #{0} not found")]
    UserNotFound(i64),

    #[error("no user with email address {0}")]
    EmailNotFound(String),

    #[error("email address {0} is already registered")]
    EmailTaken(String),

    #[error("vehicle #{0} not found")]
    VehicleNotFound(i64),

    #[error("schedule item #{0} not found")]
    ScheduleItemNotFound(i64),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Ordered migration scripts; `schema_version` records how many have run.
const MIGRATIONS: &[&str] = &[
    // v1: initial schema
    r#"
    CREATE TABLE users (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        email_address   TEXT NOT NULL UNIQUE,
        password_hash   TEXT NOT NULL
    );

    CREATE TABLE vehicles (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id   INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        year      INTEGER,
        make      TEXT,
        model     TEXT
    );
    CREATE INDEX idx_vehicles_user ON vehicles (user_id);

    CREATE TABLE schedule_items (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        vehicle_id   INTEGER NOT NULL REFERENCES vehicles (id) ON DELETE CASCADE,
        description  TEXT NOT NULL,
        due_date     TEXT
    );
    CREATE INDEX idx_schedule_items_vehicle ON schedule_items (vehicle_id);
    "#,
];

/// Database handle holding the connection pool.
///
/// Cheap to clone; all clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) a database file and apply migrations.
    pub async fn open(path: &str) -> Result<Self, DbError> {
        info!("opening database at {path}");

        // SQLite creates the file but not its directory.
        if let Some(parent) = std::path::Path::new(path.trim_start_matches("sqlite://")).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DbError::Sqlx(sqlx::Error::Io(e))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(path)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for tests.
    ///
    /// A single connection is forced: each connection to `:memory:` would
    /// otherwise see its own empty database.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        debug!("opening in-memory database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Current schema version (0 before any migration).
    pub async fn schema_version(&self) -> Result<i64, DbError> {
        let table_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
        )
        .fetch_one(&self.pool)
        .await?;

        if !table_exists {
            return Ok(0);
        }

        let version: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
                .fetch_one(&self.pool)
                .await?;
        Ok(version)
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        let current = self.schema_version().await?;
        if current as usize >= MIGRATIONS.len() {
            debug!("database is up to date (version {current})");
            return Ok(());
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version     INTEGER PRIMARY KEY,
                applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )
        .execute(&self.pool)
        .await?;

        for (i, migration) in MIGRATIONS.iter().enumerate().skip(current as usize) {
            let version = (i + 1) as i64;
            info!("applying migration v{version}");

            let mut tx = self.pool.begin().await?;
            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
                .bind(version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        info!("database migrated to version {}", MIGRATIONS.len());
        Ok(())
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
