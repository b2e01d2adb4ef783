// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use super::Database;
use crate::error::AppError;
use crate::models::event::{
    Event, NewEvent, Participant, RegisterOutcome, Registration, RegistrationStatus,
};
use crate::time_utils::{format_db_timestamp, now_db};
use chrono::{DateTime, Utc};

const EVENT_COLUMNS: &str = "e.id AS id, e.organizer_id AS organizer_id, e.crew_id AS crew_id, \
     e.title AS title, e.description AS description, e.location AS location, \
     e.starts_at AS starts_at, e.capacity AS capacity, \
     (SELECT COUNT(*) FROM event_registrations r \
        WHERE r.event_id = e.id AND r.status IN ('registered', 'completed')) AS participant_count, \
     e.created_at AS created_at";

const REGISTRATION_COLUMNS: &str = "event_id, user_id, status, registered_at, updated_at";

impl Database {
    // ─── Event Operations ────────────────────────────────────────

    pub async fn insert_event(&self, event: &NewEvent) -> Result<Event, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO events (organizer_id, crew_id, title, description, location, starts_at, \
             capacity, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(event.organizer_id)
        .bind(event.crew_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(format_db_timestamp(event.starts_at))
        .bind(event.capacity)
        .bind(format_db_timestamp(now_db()))
        .fetch_one(&self.pool)
        .await?;

        self.get_event(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn get_event(&self, event_id: i64) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// Events starting at or after `from`, soonest first.
    pub async fn list_upcoming_events(
        &self,
        from: DateTime<Utc>,
        crew_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Event>, AppError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.starts_at >= ?1 AND (?2 IS NULL OR e.crew_id = ?2) \
             ORDER BY e.starts_at, e.id LIMIT ?3"
        );
        let rows = sqlx::query_as::<_, Event>(&sql)
            .bind(format_db_timestamp(from))
            .bind(crew_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // ─── Registration Operations ─────────────────────────────────

    pub async fn get_registration(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<Registration>, AppError> {
        let sql = format!(
            "SELECT {REGISTRATION_COLUMNS} FROM event_registrations WHERE event_id = ? AND user_id = ?"
        );
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Register a user, enforcing capacity. A previously cancelled
    /// registration is reactivated.
    ///
    /// The capacity check and the write are one statement, so concurrent
    /// registrations never overfill the event.
    pub async fn register_for_event(
        &self,
        event_id: i64,
        user_id: i64,
        capacity: Option<i64>,
    ) -> Result<RegisterOutcome, AppError> {
        let sql = format!(
            "INSERT INTO event_registrations (event_id, user_id, status, registered_at, updated_at) \
             SELECT ?1, ?2, ?3, ?4, ?4 \
             WHERE ?5 IS NULL OR ( \
                SELECT COUNT(*) FROM event_registrations \
                WHERE event_id = ?1 AND status IN ('registered', 'completed') \
             ) < ?5 \
             ON CONFLICT (event_id, user_id) DO UPDATE SET \
               status = excluded.status, registered_at = excluded.registered_at, \
               updated_at = excluded.updated_at \
             WHERE event_registrations.status = 'cancelled' \
             RETURNING {REGISTRATION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .bind(user_id)
            .bind(RegistrationStatus::Registered)
            .bind(format_db_timestamp(now_db()))
            .bind(capacity)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(registration) = inserted {
            return Ok(RegisterOutcome::Registered(registration));
        }

        // Nothing written: either an active registration exists or the event is full.
        let existing = self.get_registration(event_id, user_id).await?;
        if existing.is_some_and(|r| r.status.is_active()) {
            Ok(RegisterOutcome::AlreadyRegistered)
        } else {
            Ok(RegisterOutcome::Full)
        }
    }

    /// Move an existing registration to `status`.
    pub async fn set_registration_status(
        &self,
        event_id: i64,
        user_id: i64,
        status: RegistrationStatus,
    ) -> Result<Option<Registration>, AppError> {
        let sql = format!(
            "UPDATE event_registrations SET status = ?, updated_at = ? \
             WHERE event_id = ? AND user_id = ? RETURNING {REGISTRATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(status)
            .bind(format_db_timestamp(now_db()))
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All registrations for an event, in registration order.
    pub async fn list_participants(&self, event_id: i64) -> Result<Vec<Participant>, AppError> {
        let rows = sqlx::query_as::<_, Participant>(
            "SELECT r.user_id AS user_id, u.name AS name, u.profile_image AS profile_image, \
                    r.status AS status, r.registered_at AS registered_at \
             FROM event_registrations r JOIN users u ON u.id = r.user_id \
             WHERE r.event_id = ? AND u.deleted_at IS NULL \
             ORDER BY r.registered_at, r.user_id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::NewUser;
    use chrono::Duration;

    async fn user(db: &Database, account: &str) -> i64 {
        db.find_or_create_user(&NewUser {
            provider: "naver".to_string(),
            provider_account_id: account.to_string(),
            email: None,
            name: account.to_string(),
            profile_image: None,
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_capacity_and_reregistration() {
        let db = Database::connect_in_memory().await.unwrap();
        let organizer = user(&db, "org").await;
        let a = user(&db, "a").await;
        let b = user(&db, "b").await;

        let event = db
            .insert_event(&NewEvent {
                organizer_id: organizer,
                crew_id: None,
                title: "Sunday long run".to_string(),
                description: None,
                location: Some("Han River".to_string()),
                starts_at: Utc::now() + Duration::days(2),
                capacity: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(event.participant_count, 0);

        let first = db.register_for_event(event.id, a, event.capacity).await.unwrap();
        assert!(matches!(first, RegisterOutcome::Registered(_)));
        assert_eq!(
            db.register_for_event(event.id, a, event.capacity).await.unwrap(),
            RegisterOutcome::AlreadyRegistered
        );
        assert_eq!(
            db.register_for_event(event.id, b, event.capacity).await.unwrap(),
            RegisterOutcome::Full
        );

        db.set_registration_status(event.id, a, RegistrationStatus::Cancelled)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(db.get_event(event.id).await.unwrap().unwrap().participant_count, 0);

        let second = db.register_for_event(event.id, b, event.capacity).await.unwrap();
        assert!(matches!(second, RegisterOutcome::Registered(_)));
        assert_eq!(db.list_participants(event.id).await.unwrap().len(), 2);
    }
}
