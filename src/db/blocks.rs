// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::follows::remove_follow_edge;
use super::Database;
use crate::error::AppError;
use crate::models::cursor::PageRequest;
use crate::models::social::RelationEntry;
use crate::time_utils::{format_db_timestamp, now_db};

impl Database {
    // ─── Block Operations ────────────────────────────────────────

    /// Block `blocked_id` and drop any follow edges between the two users.
    ///
    /// Blocking an already-blocked user is a no-op.
    pub async fn block(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO blocks (blocker_id, blocked_id, created_at) VALUES (?, ?, ?) \
             ON CONFLICT (blocker_id, blocked_id) DO NOTHING",
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .bind(format_db_timestamp(now_db()))
        .execute(&mut *tx)
        .await?;

        remove_follow_edge(&mut tx, blocker_id, blocked_id).await?;
        remove_follow_edge(&mut tx, blocked_id, blocker_id).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove a block. Unblocking a user that is not blocked is a no-op.
    pub async fn unblock(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blocks WHERE blocker_id = ? AND blocked_id = ?")
            .bind(blocker_id)
            .bind(blocked_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// True if either user has blocked the other.
    pub async fn is_blocked_either_way(&self, a: i64, b: i64) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM blocks \
             WHERE (blocker_id = ?1 AND blocked_id = ?2) OR (blocker_id = ?2 AND blocked_id = ?1) \
             LIMIT 1",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Users blocked by `blocker_id`, most recent first.
    pub async fn list_blocked(
        &self,
        blocker_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<RelationEntry>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let rows = sqlx::query_as::<_, RelationEntry>(
            "SELECT u.id AS id, u.name AS name, u.profile_image AS profile_image, b.created_at AS since \
             FROM blocks b JOIN users u ON u.id = b.blocked_id \
             WHERE b.blocker_id = ?3 \
               AND (?1 IS NULL OR b.created_at < ?1 OR (b.created_at = ?1 AND u.id < ?2)) \
             ORDER BY b.created_at DESC, u.id DESC LIMIT ?4",
        )
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(blocker_id)
        .bind(page.fetch_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;

    async fn user(db: &Database, account: &str) -> i64 {
        db.find_or_create_user(&NewUser {
            provider: "kakao".to_string(),
            provider_account_id: account.to_string(),
            email: None,
            name: account.to_string(),
            profile_image: None,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_block_removes_follows_and_counters() {
        let db = Database::connect_in_memory().await.unwrap();
        let a = user(&db, "a").await;
        let b = user(&db, "b").await;

        assert!(db.follow(a, b).await.unwrap());
        assert!(db.follow(b, a).await.unwrap());
        assert!(!db.follow(a, b).await.unwrap());

        db.block(a, b).await.unwrap();
        db.block(a, b).await.unwrap();

        assert!(!db.is_following(a, b).await.unwrap());
        assert!(!db.is_following(b, a).await.unwrap());
        assert!(db.is_blocked_either_way(b, a).await.unwrap());

        let ua = db.get_user(a).await.unwrap().unwrap();
        let ub = db.get_user(b).await.unwrap().unwrap();
        assert_eq!((ua.follower_count, ua.following_count), (0, 0));
        assert_eq!((ub.follower_count, ub.following_count), (0, 0));

        db.unblock(a, b).await.unwrap();
        assert!(!db.is_blocked_either_way(a, b).await.unwrap());
    }
}
