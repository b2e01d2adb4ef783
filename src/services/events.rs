// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Group run events and the registration lifecycle.
//!
//! A registration moves `registered -> cancelled` when the participant
//! withdraws and `registered -> completed` when the organizer confirms
//! attendance. A cancelled registration can register again.

use crate::error::AppError;
use crate::models::event::{
    Event, NewEvent, Participant, RegisterOutcome, Registration, RegistrationStatus,
};
use crate::models::notification::NotificationKind;
use crate::time_utils::now_db;
use crate::AppState;
use serde_json::json;

fn event_not_found() -> AppError {
    AppError::NotFound("Event not found".to_string())
}

fn registration_not_found() -> AppError {
    AppError::NotFound("Registration not found".to_string())
}

pub async fn get_event(state: &AppState, event_id: i64) -> Result<Event, AppError> {
    state.db.get_event(event_id).await?.ok_or_else(event_not_found)
}

pub async fn create_event(state: &AppState, event: NewEvent) -> Result<Event, AppError> {
    if let Some(crew_id) = event.crew_id {
        if state.db.get_crew(crew_id).await?.is_none() {
            return Err(AppError::NotFound("Crew not found".to_string()));
        }
        if state.db.crew_role(crew_id, event.organizer_id).await?.is_none() {
            return Err(AppError::Forbidden(
                "Only crew members can create crew events".to_string(),
            ));
        }
    }

    let created = state.db.insert_event(&event).await?;
    tracing::info!(user_id = event.organizer_id, event_id = created.id, "Event created");
    Ok(created)
}

/// Upcoming events, soonest first.
pub async fn upcoming(
    state: &AppState,
    crew_id: Option<i64>,
    limit: i64,
) -> Result<Vec<Event>, AppError> {
    state.db.list_upcoming_events(now_db(), crew_id, limit).await
}

pub async fn register(
    state: &AppState,
    user_id: i64,
    event_id: i64,
) -> Result<Registration, AppError> {
    let event = get_event(state, event_id).await?;

    let registration = match state
        .db
        .register_for_event(event_id, user_id, event.capacity)
        .await?
    {
        RegisterOutcome::Registered(registration) => registration,
        RegisterOutcome::AlreadyRegistered => {
            return Err(AppError::Conflict("Already registered".to_string()))
        }
        RegisterOutcome::Full => return Err(AppError::Conflict("Event is full".to_string())),
    };

    tracing::info!(user_id, event_id, "Registered for event");
    state
        .notifications
        .notify(
            event.organizer_id,
            user_id,
            NotificationKind::EventRegistration,
            json!({ "eventId": event_id, "userId": user_id }),
        )
        .await;
    Ok(registration)
}

/// Withdraw from an event. Only an active `registered` entry can be cancelled.
pub async fn cancel(
    state: &AppState,
    user_id: i64,
    event_id: i64,
) -> Result<Registration, AppError> {
    get_event(state, event_id).await?;

    let current = state
        .db
        .get_registration(event_id, user_id)
        .await?
        .ok_or_else(registration_not_found)?;

    match current.status {
        RegistrationStatus::Registered => {}
        RegistrationStatus::Cancelled => return Err(registration_not_found()),
        RegistrationStatus::Completed => {
            return Err(AppError::Conflict(
                "Completed registrations cannot be cancelled".to_string(),
            ))
        }
    }

    let updated = state
        .db
        .set_registration_status(event_id, user_id, RegistrationStatus::Cancelled)
        .await?
        .ok_or_else(registration_not_found)?;
    tracing::info!(user_id, event_id, "Cancelled event registration");
    Ok(updated)
}

/// Organizer marks a participant as having completed the event.
pub async fn complete(
    state: &AppState,
    organizer_id: i64,
    event_id: i64,
    participant_id: i64,
) -> Result<Registration, AppError> {
    let event = get_event(state, event_id).await?;
    if event.organizer_id != organizer_id {
        return Err(AppError::Forbidden(
            "Only the organizer can complete registrations".to_string(),
        ));
    }

    let current = state
        .db
        .get_registration(event_id, participant_id)
        .await?
        .ok_or_else(registration_not_found)?;
    if current.status == RegistrationStatus::Cancelled {
        return Err(AppError::Conflict("Registration was cancelled".to_string()));
    }

    state
        .db
        .set_registration_status(event_id, participant_id, RegistrationStatus::Completed)
        .await?
        .ok_or_else(registration_not_found)
}

pub async fn participants(state: &AppState, event_id: i64) -> Result<Vec<Participant>, AppError> {
    get_event(state, event_id).await?;
    state.db.list_participants(event_id).await
}
