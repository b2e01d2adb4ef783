// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::{is_unique_violation, AppError};
use crate::models::crew::{BoardPost, BoardPostWithAuthor, Crew, CrewMember, CrewRole};
use crate::models::cursor::PageRequest;
use crate::time_utils::{format_db_timestamp, now_db};

const CREW_COLUMNS: &str = "id, name, description, owner_id, member_count, created_at";

impl Database {
    // ─── Crew Operations ─────────────────────────────────────────

    /// Create a crew with its owner as the first member.
    ///
    /// Returns `None` if the name is taken.
    pub async fn insert_crew(
        &self,
        owner_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Crew>, AppError> {
        let now = format_db_timestamp(now_db());
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO crews (name, description, owner_id, member_count, created_at) \
             VALUES (?, ?, ?, 1, ?) RETURNING {CREW_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Crew>(&sql)
            .bind(name)
            .bind(description)
            .bind(owner_id)
            .bind(&now)
            .fetch_one(&mut *tx)
            .await;

        let crew = match inserted {
            Ok(crew) => crew,
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        sqlx::query("INSERT INTO crew_members (crew_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)")
            .bind(crew.id)
            .bind(owner_id)
            .bind(CrewRole::Owner)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(crew))
    }

    pub async fn get_crew(&self, crew_id: i64) -> Result<Option<Crew>, AppError> {
        let sql = format!("SELECT {CREW_COLUMNS} FROM crews WHERE id = ?");
        let crew = sqlx::query_as::<_, Crew>(&sql)
            .bind(crew_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(crew)
    }

    /// One page of crews, newest first.
    pub async fn list_crews(&self, page: &PageRequest) -> Result<Vec<Crew>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {CREW_COLUMNS} FROM crews \
             WHERE (?1 IS NULL OR created_at < ?1 OR (created_at = ?1 AND id < ?2)) \
             ORDER BY created_at DESC, id DESC LIMIT ?3"
        );
        let rows = sqlx::query_as::<_, Crew>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Active members, in join order.
    pub async fn list_crew_members(&self, crew_id: i64) -> Result<Vec<CrewMember>, AppError> {
        let rows = sqlx::query_as::<_, CrewMember>(
            "SELECT m.user_id AS user_id, u.name AS name, u.profile_image AS profile_image, \
                    m.role AS role, m.joined_at AS joined_at \
             FROM crew_members m JOIN users u ON u.id = m.user_id \
             WHERE m.crew_id = ? AND u.deleted_at IS NULL \
             ORDER BY m.joined_at, m.user_id",
        )
        .bind(crew_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Role of `user_id` in a crew, or `None` if not a member.
    pub async fn crew_role(&self, crew_id: i64, user_id: i64) -> Result<Option<CrewRole>, AppError> {
        let row: Option<(CrewRole,)> =
            sqlx::query_as("SELECT role FROM crew_members WHERE crew_id = ? AND user_id = ?")
                .bind(crew_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(role,)| role))
    }

    /// Add a member. Returns `false` if already a member.
    pub async fn join_crew(&self, crew_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT INTO crew_members (crew_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(crew_id)
        .bind(user_id)
        .bind(CrewRole::Member)
        .bind(format_db_timestamp(now_db()))
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        sqlx::query("UPDATE crews SET member_count = member_count + 1 WHERE id = ?")
            .bind(crew_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Remove a member. Returns `false` if not a member.
    pub async fn leave_crew(&self, crew_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM crew_members WHERE crew_id = ? AND user_id = ?")
            .bind(crew_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE crews SET member_count = member_count - 1 WHERE id = ?")
            .bind(crew_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // ─── Crew Board Operations ───────────────────────────────────

    pub async fn insert_board_post(
        &self,
        crew_id: i64,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<BoardPost, AppError> {
        let row = sqlx::query_as::<_, BoardPost>(
            "INSERT INTO crew_board_posts (crew_id, author_id, title, content, created_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id, crew_id, author_id, title, content, created_at",
        )
        .bind(crew_id)
        .bind(author_id)
        .bind(title)
        .bind(content)
        .bind(format_db_timestamp(now_db()))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_board_post(
        &self,
        crew_id: i64,
        post_id: i64,
    ) -> Result<Option<BoardPost>, AppError> {
        let row = sqlx::query_as::<_, BoardPost>(
            "SELECT id, crew_id, author_id, title, content, created_at \
             FROM crew_board_posts WHERE id = ? AND crew_id = ?",
        )
        .bind(post_id)
        .bind(crew_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_board_posts(
        &self,
        crew_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<BoardPostWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let rows = sqlx::query_as::<_, BoardPostWithAuthor>(
            "SELECT p.id AS id, p.crew_id AS crew_id, p.author_id AS author_id, p.title AS title, \
                    p.content AS content, p.created_at AS created_at, \
                    u.name AS author_name, u.profile_image AS author_profile_image \
             FROM crew_board_posts p JOIN users u ON u.id = p.author_id \
             WHERE p.crew_id = ?3 \
               AND (?1 IS NULL OR p.created_at < ?1 OR (p.created_at = ?1 AND p.id < ?2)) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?4",
        )
        .bind(cursor_ts)
        .bind(cursor_id)
        .bind(crew_id)
        .bind(page.fetch_limit())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete_board_post(&self, post_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM crew_board_posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
