// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crews (running groups), their members and board posts.

use crate::models::cursor::{FeedCursor, Keyed};
use crate::models::user::{AuthorColumns, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Keyed for Crew {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.created_at,
            id: self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum CrewRole {
    Owner,
    Member,
}

/// Member listing row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CrewMember {
    pub user_id: i64,
    pub name: String,
    pub profile_image: Option<String>,
    pub role: CrewRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BoardPost {
    pub id: i64,
    pub crew_id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BoardPostWithAuthor {
    #[sqlx(flatten)]
    pub post: BoardPost,
    #[sqlx(flatten)]
    pub author: AuthorColumns,
}

impl Keyed for BoardPostWithAuthor {
    fn cursor_key(&self) -> FeedCursor {
        FeedCursor {
            created_at: self.post.created_at,
            id: self.post.id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPostResponse {
    pub id: i64,
    pub crew_id: i64,
    pub author: UserSummary,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<BoardPostWithAuthor> for BoardPostResponse {
    fn from(row: BoardPostWithAuthor) -> Self {
        let p = row.post;
        Self {
            author: row.author.into_summary(p.author_id),
            id: p.id,
            crew_id: p.crew_id,
            title: p.title,
            content: p.content,
            created_at: p.created_at,
        }
    }
}
