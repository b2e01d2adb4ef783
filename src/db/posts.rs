// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::{not_blocked, Database};
use crate::error::{is_unique_violation, AppError};
use crate::models::cursor::PageRequest;
use crate::models::post::{Comment, CommentWithAuthor, NewPost, Post, PostWithAuthor};
use crate::time_utils::{format_db_timestamp, now_db};

const POST_COLUMNS: &str = "p.id AS id, p.author_id AS author_id, p.content AS content, \
     p.image_url AS image_url, p.workout_id AS workout_id, p.like_count AS like_count, \
     p.comment_count AS comment_count, p.created_at AS created_at, \
     u.name AS author_name, u.profile_image AS author_profile_image";

const COMMENT_COLUMNS: &str = "c.id AS id, c.post_id AS post_id, c.author_id AS author_id, \
     c.content AS content, c.created_at AS created_at, \
     u.name AS author_name, u.profile_image AS author_profile_image";

impl Database {
    // ─── Post Operations ─────────────────────────────────────────

    pub async fn insert_post(&self, post: &NewPost) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (author_id, content, image_url, workout_id, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             RETURNING id, author_id, content, image_url, workout_id, like_count, comment_count, created_at",
        )
        .bind(post.author_id)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.workout_id)
        .bind(format_db_timestamp(now_db()))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Get a post with its author as seen by `viewer`.
    pub async fn get_post(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<PostWithAuthor>, AppError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE p.id = ?1 AND u.deleted_at IS NULL AND {}",
            not_blocked("?2", "p.author_id")
        );
        let row = sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(post_id)
            .bind(viewer)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One page of all posts visible to `viewer`.
    pub async fn list_posts(
        &self,
        viewer: Option<i64>,
        page: &PageRequest,
    ) -> Result<Vec<PostWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE u.deleted_at IS NULL AND {} \
               AND (?1 IS NULL OR p.created_at < ?1 OR (p.created_at = ?1 AND p.id < ?2)) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?4",
            not_blocked("?3", "p.author_id")
        );
        let rows = sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(viewer)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One page of a single user's posts.
    pub async fn list_user_posts(
        &self,
        author_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<PostWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id \
             WHERE p.author_id = ?3 \
               AND (?1 IS NULL OR p.created_at < ?1 OR (p.created_at = ?1 AND p.id < ?2)) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?4"
        );
        let rows = sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(author_id)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // ─── Comment Operations ──────────────────────────────────────

    /// Insert a comment and bump the post's comment counter.
    pub async fn insert_comment(
        &self,
        post_id: i64,
        author_id: i64,
        content: &str,
    ) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await?;

        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (post_id, author_id, content, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, post_id, author_id, content, created_at",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content)
        .bind(format_db_timestamp(now_db()))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE posts SET comment_count = comment_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, content, created_at FROM comments WHERE id = ?",
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Comments on a post, newest first, hiding authors blocked relative to `viewer`.
    pub async fn list_comments(
        &self,
        post_id: i64,
        viewer: Option<i64>,
        page: &PageRequest,
    ) -> Result<Vec<CommentWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments c JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = ?3 AND u.deleted_at IS NULL AND {} \
               AND (?1 IS NULL OR c.created_at < ?1 OR (c.created_at = ?1 AND c.id < ?2)) \
             ORDER BY c.created_at DESC, c.id DESC LIMIT ?5",
            not_blocked("?4", "c.author_id")
        );
        let rows = sqlx::query_as::<_, CommentWithAuthor>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(post_id)
            .bind(viewer)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Delete a comment and decrement the post's comment counter.
    pub async fn delete_comment(&self, comment: &Comment) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() > 0 {
            sqlx::query("UPDATE posts SET comment_count = comment_count - 1 WHERE id = ?")
                .bind(comment.post_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    // ─── Like Operations ─────────────────────────────────────────

    /// Like a post. Returns `false` if the user already liked it.
    pub async fn like_post(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let inserted =
            sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES (?, ?, ?)")
                .bind(post_id)
                .bind(user_id)
                .bind(format_db_timestamp(now_db()))
                .execute(&mut *tx)
                .await;

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) => return Err(e.into()),
        }

        sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Remove a like. Returns `false` if the user had not liked the post.
    pub async fn unlike_post(&self, post_id: i64, user_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = ? AND user_id = ?")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE posts SET like_count = like_count - 1 WHERE id = ?")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
