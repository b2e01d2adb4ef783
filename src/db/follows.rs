// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::{is_unique_violation, AppError};
use crate::models::cursor::PageRequest;
use crate::models::social::RelationEntry;
use crate::time_utils::{format_db_timestamp, now_db};

impl Database {
    // ─── Follow Operations ───────────────────────────────────────

    /// Create a follow edge and bump both counters atomically.
    ///
    /// Returns `false` if the edge already existed.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted =
            sqlx::query("INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?, ?, ?)")
                .bind(follower_id)
                .bind(followee_id)
                .bind(format_db_timestamp(now_db()))
                .execute(&mut *tx)
                .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        sqlx::query("UPDATE users SET following_count = following_count + 1 WHERE id = ?")
            .bind(follower_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE users SET follower_count = follower_count + 1 WHERE id = ?")
            .bind(followee_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Remove a follow edge and decrement both counters atomically.
    ///
    /// Returns `false` if there was no edge.
    pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let removed = remove_follow_edge(&mut tx, follower_id, followee_id).await?;
        tx.commit().await?;
        Ok(removed)
    }

    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?")
                .bind(follower_id)
                .bind(followee_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Users following `user_id`, most recent first.
    pub async fn list_followers(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<RelationEntry>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let rows = sqlx::query_as::<_, RelationEntry>(
            "SELECT u.id AS id, u.name AS name, u.profile_image AS profile_image, f.created_at AS since \
             FROM follows f JOIN users u ON u.id = f.follower_id \
             WHERE f.followee_id = ?3 AND u.deleted_at IS NULL \
               AND (?1 IS NULL OR f.created_at < ?1 OR (f.created_at = ?1 AND u.id < ?2)) \
             ORDER BY f.created_at DESC, u.id DESC LIMIT ?4",
        )
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(user_id)
        .bind(page.fetch_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Users that `user_id` follows, most recent first.
    pub async fn list_following(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<RelationEntry>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let rows = sqlx::query_as::<_, RelationEntry>(
            "SELECT u.id AS id, u.name AS name, u.profile_image AS profile_image, f.created_at AS since \
             FROM follows f JOIN users u ON u.id = f.followee_id \
             WHERE f.follower_id = ?3 AND u.deleted_at IS NULL \
               AND (?1 IS NULL OR f.created_at < ?1 OR (f.created_at = ?1 AND u.id < ?2)) \
             ORDER BY f.created_at DESC, u.id DESC LIMIT ?4",
        )
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(user_id)
        .bind(page.fetch_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Delete one follow edge inside a transaction, keeping counters in step.
pub(super) async fn remove_follow_edge(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    follower_id: i64,
    followee_id: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
        .bind(follower_id)
        .bind(followee_id)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE users SET following_count = following_count - 1 WHERE id = ?")
        .bind(follower_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("UPDATE users SET follower_count = follower_count - 1 WHERE id = ?")
        .bind(followee_id)
        .execute(&mut **tx)
        .await?;

    Ok(true)
}
