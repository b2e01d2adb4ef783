// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Distance challenges and leaderboards.

use crate::error::AppError;
use crate::models::challenge::{Challenge, LeaderboardEntry, NewChallenge, ParticipantProgress};
use crate::models::cursor::{Page, PageRequest};
use crate::time_utils::now_db;
use crate::AppState;

fn challenge_not_found() -> AppError {
    AppError::NotFound("Challenge not found".to_string())
}

pub async fn get_challenge(state: &AppState, challenge_id: i64) -> Result<Challenge, AppError> {
    state
        .db
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(challenge_not_found)
}

pub async fn create_challenge(
    state: &AppState,
    challenge: NewChallenge,
) -> Result<Challenge, AppError> {
    if challenge.goal_distance_meters.is_nan() || challenge.goal_distance_meters <= 0.0 {
        return Err(AppError::BadRequest(
            "goalDistanceMeters must be positive".to_string(),
        ));
    }
    if challenge.starts_at >= challenge.ends_at {
        return Err(AppError::BadRequest(
            "startsAt must be before endsAt".to_string(),
        ));
    }

    let created = state.db.insert_challenge(&challenge).await?;
    tracing::info!(
        user_id = challenge.creator_id,
        challenge_id = created.id,
        "Challenge created"
    );
    Ok(created)
}

pub async fn list_challenges(
    state: &AppState,
    page: &PageRequest,
) -> Result<Page<Challenge>, AppError> {
    let rows = state.db.list_challenges(page).await?;
    Ok(Page::from_rows(rows, page))
}

pub async fn join(state: &AppState, user_id: i64, challenge_id: i64) -> Result<(), AppError> {
    let challenge = get_challenge(state, challenge_id).await?;
    if challenge.has_ended(now_db()) {
        return Err(AppError::BadRequest("Challenge has ended".to_string()));
    }

    if !state.db.join_challenge(challenge_id, user_id).await? {
        return Err(AppError::Conflict("Already joined".to_string()));
    }
    tracing::info!(user_id, challenge_id, "Joined challenge");
    Ok(())
}

pub async fn leaderboard(
    state: &AppState,
    challenge_id: i64,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let challenge = get_challenge(state, challenge_id).await?;
    let progress = state.db.challenge_progress(&challenge).await?;
    Ok(rank_progress(progress, challenge.goal_distance_meters))
}

/// Assign competition ranks ("1224") to progress rows sorted by distance.
fn rank_progress(progress: Vec<ParticipantProgress>, goal_meters: f64) -> Vec<LeaderboardEntry> {
    let mut entries = Vec::with_capacity(progress.len());
    let mut rank = 0;
    let mut previous: Option<f64> = None;

    for (index, row) in progress.into_iter().enumerate() {
        if previous != Some(row.distance_meters) {
            rank = index as u32 + 1;
            previous = Some(row.distance_meters);
        }
        entries.push(LeaderboardEntry {
            rank,
            completed: row.distance_meters >= goal_meters,
            user_id: row.user_id,
            name: row.name,
            profile_image: row.profile_image,
            distance_meters: row.distance_meters,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(user_id: i64, distance_meters: f64) -> ParticipantProgress {
        ParticipantProgress {
            user_id,
            name: format!("runner {user_id}"),
            profile_image: None,
            distance_meters,
        }
    }

    #[test]
    fn test_ties_share_rank() {
        let entries = rank_progress(
            vec![
                progress(1, 12_000.0),
                progress(2, 8_000.0),
                progress(3, 8_000.0),
                progress(4, 0.0),
            ],
            10_000.0,
        );

        let ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);

        let completed: Vec<bool> = entries.iter().map(|e| e.completed).collect();
        assert_eq!(completed, vec![true, false, false, false]);
    }

    #[test]
    fn test_goal_reached_exactly_counts() {
        let entries = rank_progress(vec![progress(1, 5_000.0)], 5_000.0);
        assert!(entries[0].completed);
    }
}
