// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite via sqlx).
//!
//! [`Database`] wraps a connection pool. Queries are grouped by entity in
//! the submodules, each adding an `impl Database` block.
//!
//! Timestamps are always bound as strings produced by
//! [`format_db_timestamp`](crate::time_utils::format_db_timestamp) so that
//! keyset comparisons on `created_at` are plain string comparisons.

mod blocks;
mod challenges;
mod conversations;
mod crews;
mod events;
mod follows;
mod notifications;
mod posts;
mod users;
mod workouts;

use crate::error::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 10;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQL predicate: true unless a block exists in either direction between the
/// viewer bound at `?viewer` and the user in column `user_col`.
///
/// A NULL viewer (anonymous request) never matches a block row.
fn not_blocked(viewer: &str, user_col: &str) -> String {
    format!(
        "NOT EXISTS (SELECT 1 FROM blocks b \
         WHERE (b.blocker_id = {viewer} AND b.blocked_id = {user_col}) \
            OR (b.blocker_id = {user_col} AND b.blocked_id = {viewer}))"
    )
}

/// SQLite database handle.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        tracing::info!(url = database_url, "Connected to database");
        Ok(db)
    }

    /// Fresh in-memory database with the schema applied.
    ///
    /// Uses a single connection that never expires, since every new
    /// connection to `:memory:` would open a separate empty database.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.into()))
    }

    /// Underlying pool, for health checks and tests.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity check.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_has_schema() {
        let db = Database::connect_in_memory().await.unwrap();
        db.ping().await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
