// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::AppError;
use crate::models::conversation::{ordered_pair, Conversation, Message};
use crate::models::cursor::PageRequest;
use crate::time_utils::{format_db_timestamp, now_db};

const CONVERSATION_COLUMNS: &str = "id, user_a_id, user_b_id, created_at, last_message_at";

impl Database {
    // ─── Conversation Operations ─────────────────────────────────

    /// Return the conversation between two users, creating it if needed.
    pub async fn get_or_create_conversation(
        &self,
        user_id: i64,
        other_id: i64,
    ) -> Result<Conversation, AppError> {
        let (a, b) = ordered_pair(user_id, other_id);
        let now = format_db_timestamp(now_db());

        sqlx::query(
            "INSERT INTO conversations (user_a_id, user_b_id, created_at, last_message_at) \
             VALUES (?, ?, ?, ?) ON CONFLICT (user_a_id, user_b_id) DO NOTHING",
        )
        .bind(a)
        .bind(b)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE user_a_id = ? AND user_b_id = ?"
        );
        let conversation = sqlx::query_as::<_, Conversation>(&sql)
            .bind(a)
            .bind(b)
            .fetch_one(&self.pool)
            .await?;
        Ok(conversation)
    }

    pub async fn get_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<Option<Conversation>, AppError> {
        let sql = format!("SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ?");
        let row = sqlx::query_as::<_, Conversation>(&sql)
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Conversations involving `user_id`, most recently active first.
    pub async fn list_conversations(&self, user_id: i64) -> Result<Vec<Conversation>, AppError> {
        let sql = format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations \
             WHERE user_a_id = ?1 OR user_b_id = ?1 \
             ORDER BY last_message_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, Conversation>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Append a message and bump the conversation's `last_message_at`.
    pub async fn insert_message(
        &self,
        conversation_id: i64,
        sender_id: i64,
        body: &str,
    ) -> Result<Message, AppError> {
        let now = format_db_timestamp(now_db());
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, Message>(
            "INSERT INTO messages (conversation_id, sender_id, body, created_at) \
             VALUES (?, ?, ?, ?) RETURNING id, conversation_id, sender_id, body, created_at",
        )
        .bind(conversation_id)
        .bind(sender_id)
        .bind(body)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET last_message_at = ? WHERE id = ?")
            .bind(&now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// Messages in a conversation, newest first.
    pub async fn list_messages(
        &self,
        conversation_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<Message>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let rows = sqlx::query_as::<_, Message>(
            "SELECT id, conversation_id, sender_id, body, created_at FROM messages \
             WHERE conversation_id = ?3 \
               AND (?1 IS NULL OR created_at < ?1 OR (created_at = ?1 AND id < ?2)) \
             ORDER BY created_at DESC, id DESC LIMIT ?4",
        )
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(conversation_id)
        .bind(page.fetch_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
