// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User row.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    /// OAuth provider that created the account ("google", "kakao", "naver")
    pub provider: String,
    /// Account id at the provider
    pub provider_account_id: String,
    /// Email address (may be None if not shared by the provider)
    pub email: Option<String>,
    pub name: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Compact author/member representation embedded in other responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub profile_image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            profile_image: user.profile_image.clone(),
        }
    }
}

/// Author columns selected as `author_name` / `author_profile_image`
/// alongside a content row.
#[derive(Debug, Clone, FromRow)]
pub struct AuthorColumns {
    pub author_name: String,
    pub author_profile_image: Option<String>,
}

impl AuthorColumns {
    pub fn into_summary(self, id: i64) -> UserSummary {
        UserSummary {
            id,
            name: self.author_name,
            profile_image: self.author_profile_image,
        }
    }
}

/// Profile response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub name: String,
    /// Only present on the caller's own profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub follower_count: i64,
    pub following_count: i64,
    pub created_at: DateTime<Utc>,
    /// Whether the viewer follows this user (None for anonymous viewers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

impl ProfileResponse {
    pub fn from_user(user: User, include_email: bool, is_following: Option<bool>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: if include_email { user.email } else { None },
            profile_image: user.profile_image,
            bio: user.bio,
            follower_count: user.follower_count,
            following_count: user.following_count,
            created_at: user.created_at,
            is_following,
        }
    }
}

/// Self-service profile update.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_image: Option<String>,
}

/// Values for creating a user on first OAuth login.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub provider: String,
    pub provider_account_id: String,
    pub email: Option<String>,
    pub name: String,
    pub profile_image: Option<String>,
}
