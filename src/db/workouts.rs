// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::{not_blocked, Database};
use crate::error::AppError;
use crate::models::cursor::PageRequest;
use crate::models::workout::{NewWorkout, Workout, WorkoutWithAuthor};
use crate::time_utils::{format_db_timestamp, now_db};

const WORKOUT_COLUMNS: &str = "w.id AS id, w.user_id AS user_id, w.title AS title, \
     w.sport_type AS sport_type, w.distance_meters AS distance_meters, \
     w.duration_secs AS duration_secs, w.started_at AS started_at, \
     w.route_polyline AS route_polyline, w.file_key AS file_key, w.file_format AS file_format, \
     w.created_at AS created_at";

const RETURNING_COLUMNS: &str = "id, user_id, title, sport_type, distance_meters, duration_secs, \
     started_at, route_polyline, file_key, file_format, created_at";

impl Database {
    // ─── Workout Operations ──────────────────────────────────────

    pub async fn insert_workout(&self, workout: &NewWorkout) -> Result<Workout, AppError> {
        let sql = format!(
            "INSERT INTO workouts (user_id, title, sport_type, distance_meters, duration_secs, \
             started_at, route_polyline, file_key, file_format, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {RETURNING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Workout>(&sql)
            .bind(workout.user_id)
            .bind(&workout.title)
            .bind(&workout.sport_type)
            .bind(workout.distance_meters)
            .bind(workout.duration_secs)
            .bind(format_db_timestamp(workout.started_at))
            .bind(&workout.route_polyline)
            .bind(&workout.file_key)
            .bind(workout.file_format.map(|f| f.as_str()))
            .bind(format_db_timestamp(now_db()))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Get a workout with its author, hidden if the author is deleted or
    /// blocked relative to `viewer`.
    pub async fn get_workout(
        &self,
        workout_id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<WorkoutWithAuthor>, AppError> {
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS}, u.name AS author_name, u.profile_image AS author_profile_image \
             FROM workouts w JOIN users u ON u.id = w.user_id \
             WHERE w.id = ?1 AND u.deleted_at IS NULL AND {}",
            not_blocked("?2", "w.user_id")
        );
        let row = sqlx::query_as::<_, WorkoutWithAuthor>(&sql)
            .bind(workout_id)
            .bind(viewer)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Delete a workout owned by `user_id`. Returns `false` if no such workout.
    pub async fn delete_workout(&self, workout_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ? AND user_id = ?")
            .bind(workout_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Owner of a workout, if it exists.
    pub async fn workout_owner(&self, workout_id: i64) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM workouts WHERE id = ?")
            .bind(workout_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// One page of the global workout feed as seen by `viewer`.
    ///
    /// Ordered by `(created_at DESC, id DESC)`; rows strictly after the
    /// request cursor. Fetches `limit + 1` rows.
    pub async fn feed_workouts(
        &self,
        viewer: Option<i64>,
        page: &PageRequest,
    ) -> Result<Vec<WorkoutWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS}, u.name AS author_name, u.profile_image AS author_profile_image \
             FROM workouts w JOIN users u ON u.id = w.user_id \
             WHERE u.deleted_at IS NULL AND {} \
               AND (?1 IS NULL OR w.created_at < ?1 OR (w.created_at = ?1 AND w.id < ?2)) \
             ORDER BY w.created_at DESC, w.id DESC LIMIT ?4",
            not_blocked("?3", "w.user_id")
        );
        let rows = sqlx::query_as::<_, WorkoutWithAuthor>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(viewer)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// One page of a single user's workouts.
    pub async fn list_user_workouts(
        &self,
        user_id: i64,
        page: &PageRequest,
    ) -> Result<Vec<WorkoutWithAuthor>, AppError> {
        let (cursor_ts, cursor_id) = page.cursor_binds();
        let sql = format!(
            "SELECT {WORKOUT_COLUMNS}, u.name AS author_name, u.profile_image AS author_profile_image \
             FROM workouts w JOIN users u ON u.id = w.user_id \
             WHERE w.user_id = ?3 \
               AND (?1 IS NULL OR w.created_at < ?1 OR (w.created_at = ?1 AND w.id < ?2)) \
             ORDER BY w.created_at DESC, w.id DESC LIMIT ?4"
        );
        let rows = sqlx::query_as::<_, WorkoutWithAuthor>(&sql)
            .bind(cursor_ts)
            .bind(cursor_id)
            .bind(user_id)
            .bind(page.fetch_limit())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
