// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::AppError;
use crate::models::cursor::PageRequest;
use crate::models::notification::{NewNotification, Notification};
use crate::time_utils::{format_db_timestamp, now_db};
use sqlx::types::Json;

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, actor_id, kind, payload, read_at, created_at";

impl Database {
    // ─── Notification Operations ─────────────────────────────────

    pub async fn insert_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, AppError> {
        let sql = format!(
            "INSERT INTO notifications (recipient_id, actor_id, kind, payload, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(notification.recipient_id)
            .bind(notification.actor_id)
            .bind(notification.kind)
            .bind(Json(&notification.payload))
            .bind(format_db_timestamp(now_db()))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_notifications(
        &self,
        recipient_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<Notification>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE recipient_id = ?3 \
               AND (?1 IS NULL OR created_at < ?1 OR (created_at = ?1 AND id < ?2)) \
             ORDER BY created_at DESC, id DESC LIMIT ?4"
        );
        let rows = sqlx::query_as::<_, Notification>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(recipient_id)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn unread_notification_count(&self, recipient_id: i64) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = ? AND read_at IS NULL",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification read. Returns `None` if it does not belong to
    /// `recipient_id`. Already-read notifications keep their original `read_at`.
    pub async fn mark_notification_read(
        &self,
        notification_id: i64,
        recipient_id: i64,
    ) -> Result<Option<Notification>, AppError> {
        let sql = format!(
            "UPDATE notifications SET read_at = COALESCE(read_at, ?) \
             WHERE id = ? AND recipient_id = ? RETURNING {NOTIFICATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Notification>(&sql)
            .bind(format_db_timestamp(now_db()))
            .bind(notification_id)
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Mark every unread notification read. Returns how many changed.
    pub async fn mark_all_notifications_read(&self, recipient_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET read_at = ? WHERE recipient_id = ? AND read_at IS NULL",
        )
        .bind(format_db_timestamp(now_db()))
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
