// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::{is_unique_violation, AppError};
use crate::models::user::{NewUser, ProfileUpdate, User};
use crate::time_utils::{format_db_timestamp, now_db};

const USER_COLUMNS: &str = "id, provider, provider_account_id, email, name, profile_image, bio, \
     follower_count, following_count, created_at, updated_at, deleted_at";

impl Database {
    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id, including soft-deleted users.
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user that exists and is not soft-deleted.
    pub async fn get_active_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self.get_user(user_id).await?.filter(|u| !u.is_deleted()))
    }

    /// Get a user by their OAuth provider account.
    pub async fn get_user_by_provider(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider = ? AND provider_account_id = ?"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(provider)
            .bind(provider_account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Return the user for an OAuth account, creating it on first login.
    ///
    /// Existing users are returned unchanged (including soft-deleted ones,
    /// which the caller must reject).
    pub async fn find_or_create_user(&self, new_user: &NewUser) -> Result<User, AppError> {
        if let Some(user) = self
            .get_user_by_provider(&new_user.provider, &new_user.provider_account_id)
            .await?
        {
            return Ok(user);
        }

        let now = format_db_timestamp(now_db());
        let sql = format!(
            "INSERT INTO users (provider, provider_account_id, email, name, profile_image, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, User>(&sql)
            .bind(&new_user.provider)
            .bind(&new_user.provider_account_id)
            .bind(&new_user.email)
            .bind(&new_user.name)
            .bind(&new_user.profile_image)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(user) => {
                tracing::info!(user_id = user.id, provider = %new_user.provider, "Created user");
                Ok(user)
            }
            // Concurrent first login for the same account
            Err(e) if is_unique_violation(&e) => self
                .get_user_by_provider(&new_user.provider, &new_user.provider_account_id)
                .await?
                .ok_or_else(|| AppError::Database(e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial profile update and return the updated user.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> Result<User, AppError> {
        let sql = format!(
            "UPDATE users SET \
               name = COALESCE(?, name), \
               bio = COALESCE(?, bio), \
               profile_image = COALESCE(?, profile_image), \
               updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&update.name)
            .bind(&update.bio)
            .bind(&update.profile_image)
            .bind(format_db_timestamp(now_db()))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Mark a user deleted. Tokens issued to the user stop working on their
    /// next request.
    ///
    /// Returns `false` if the user did not exist or was already deleted.
    pub async fn soft_delete_user(&self, user_id: i64) -> Result<bool, AppError> {
        let now = format_db_timestamp(now_db());
        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(account: &str) -> NewUser {
        NewUser {
            provider: "google".to_string(),
            provider_account_id: account.to_string(),
            email: Some(format!("{account}@example.com")),
            name: "Runner".to_string(),
            profile_image: None,
        }
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();

        let first = db.find_or_create_user(&new_user("acct-1")).await.unwrap();
        let second = db.find_or_create_user(&new_user("acct-1")).await.unwrap();
        assert_eq!(first.id, second.id);

        let other = db.find_or_create_user(&new_user("acct-2")).await.unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_update_profile_keeps_unset_fields() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = db.find_or_create_user(&new_user("acct-1")).await.unwrap();

        let updated = db
            .update_profile(
                user.id,
                &ProfileUpdate {
                    bio: Some("Marathoner".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Runner");
        assert_eq!(updated.bio.as_deref(), Some("Marathoner"));
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = Database::connect_in_memory().await.unwrap();
        let user = db.find_or_create_user(&new_user("acct-1")).await.unwrap();

        assert!(db.soft_delete_user(user.id).await.unwrap());
        assert!(!db.soft_delete_user(user.id).await.unwrap());

        assert!(db.get_user(user.id).await.unwrap().unwrap().is_deleted());
        assert!(db.get_active_user(user.id).await.unwrap().is_none());
    }
}
