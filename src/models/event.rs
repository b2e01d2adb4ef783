// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group run events and registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Event row with its live participant count.
#[derive(Debug, Clone, Serialize, FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub organizer_id: i64,
    pub crew_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// Maximum active registrations (None = unlimited)
    pub capacity: Option<i64>,
    /// Registrations that are `registered` or `completed`
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|cap| self.participant_count >= cap)
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer_id: i64,
    pub crew_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i64>,
}

/// Registration lifecycle.
///
/// `Cancelled` (the participant withdrew) and `Completed` (the organizer
/// confirmed attendance) are separate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Cancelled,
    Completed,
}

impl RegistrationStatus {
    /// Whether the registration occupies a seat.
    pub fn is_active(&self) -> bool {
        matches!(self, RegistrationStatus::Registered | RegistrationStatus::Completed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered(Registration),
    AlreadyRegistered,
    Full,
}

/// Participant listing row.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: i64,
    pub name: String,
    pub profile_image: Option<String>,
    pub status: RegistrationStatus,
    pub registered_at: DateTime<Utc>,
}
