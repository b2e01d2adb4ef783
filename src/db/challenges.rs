// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::{is_unique_violation, AppError};
use crate::models::challenge::{Challenge, NewChallenge, ParticipantProgress};
use crate::models::cursor::PageRequest;
use crate::time_utils::{format_db_timestamp, now_db};

const CHALLENGE_COLUMNS: &str = "c.id AS id, c.creator_id AS creator_id, c.title AS title, \
     c.description AS description, c.goal_distance_meters AS goal_distance_meters, \
     c.starts_at AS starts_at, c.ends_at AS ends_at, \
     (SELECT COUNT(*) FROM challenge_participants p WHERE p.challenge_id = c.id) AS participant_count, \
     c.created_at AS created_at";

impl Database {
    // ─── Challenge Operations ────────────────────────────────────

    pub async fn insert_challenge(&self, challenge: &NewChallenge) -> Result<Challenge, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO challenges (creator_id, title, description, goal_distance_meters, \
             starts_at, ends_at, created_at) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(challenge.creator_id)
        .bind(&challenge.title)
        .bind(&challenge.description)
        .bind(challenge.goal_distance_meters)
        .bind(format_db_timestamp(challenge.starts_at))
        .bind(format_db_timestamp(challenge.ends_at))
        .bind(format_db_timestamp(now_db()))
        .fetch_one(&self.pool)
        .await?;

        self.get_challenge(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))
    }

    pub async fn get_challenge(&self, challenge_id: i64) -> Result<Option<Challenge>, AppError> {
        let sql = format!("SELECT {CHALLENGE_COLUMNS} FROM challenges c WHERE c.id = ?");
        let row = sqlx::query_as::<_, Challenge>(&sql)
            .bind(challenge_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_challenges(&self, page: &PageRequest) -> Result<Vec<Challenge>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {CHALLENGE_COLUMNS} FROM challenges c \
             WHERE (?1 IS NULL OR c.created_at < ?1 OR (c.created_at = ?1 AND c.id < ?2)) \
             ORDER BY c.created_at DESC, c.id DESC LIMIT ?3"
        );
        let rows = sqlx::query_as::<_, Challenge>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Returns `false` if the user already joined.
    pub async fn join_challenge(&self, challenge_id: i64, user_id: i64) -> Result<bool, AppError> {
        let inserted = sqlx::query(
            "INSERT INTO challenge_participants (challenge_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(challenge_id)
        .bind(user_id)
        .bind(format_db_timestamp(now_db()))
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Total workout distance per participant inside the challenge window,
    /// highest first.
    pub async fn challenge_progress(
        &self,
        challenge: &Challenge,
    ) -> Result<Vec<ParticipantProgress>, AppError> {
        let rows = sqlx::query_as::<_, ParticipantProgress>(
            "SELECT p.user_id AS user_id, u.name AS name, u.profile_image AS profile_image, \
                    TOTAL(w.distance_meters) AS distance_meters \
             FROM challenge_participants p \
             JOIN users u ON u.id = p.user_id \
             LEFT JOIN workouts w ON w.user_id = p.user_id \
                AND w.started_at >= ?2 AND w.started_at < ?3 \
             WHERE p.challenge_id = ?1 AND u.deleted_at IS NULL \
             GROUP BY p.user_id, u.name, u.profile_image \
             ORDER BY distance_meters DESC, p.user_id",
        )
        .bind(challenge.id)
        .bind(format_db_timestamp(challenge.starts_at))
        .bind(format_db_timestamp(challenge.ends_at))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
