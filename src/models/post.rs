// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Posts, comments and likes.

use crate::models::cursor::{FeedCursor, Keyed};
use crate::models::user::{AuthorColumns, UserSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub workout_id: Option<i64>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    pub post: Post,
    #[sqlx(flatten)]
    pub author: AuthorColumns,
}

impl Keyed for PostWithAuthor {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.post.created_at,
            id: self.post.id,
        }
    }
}

/// Post response.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub author: UserSummary,
    pub content: String,
    pub image_url: Option<String>,
    pub workout_id: Option<i64>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(row: PostWithAuthor) -> Self {
        let p = row.post;
        Self {
            author: row.author.into_summary(p.author_id),
            id: p.id,
            content: p.content,
            image_url: p.image_url,
            workout_id: p.workout_id,
            like_count: p.like_count,
            comment_count: p.comment_count,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub workout_id: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentWithAuthor {
    #[sqlx(flatten)]
    pub comment: Comment,
    #[sqlx(flatten)]
    pub author: AuthorColumns,
}

impl Keyed for CommentWithAuthor {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.comment.created_at,
            id: self.comment.id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub author: UserSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(row: CommentWithAuthor) -> Self {
        let c = row.comment;
        Self {
            author: row.author.into_summary(c.author_id),
            id: c.id,
            post_id: c.post_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}
