// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Crew membership and crew board rules.

use crate::error::AppError;
use crate::models::crew::{BoardPostResponse, Crew, CrewMember, CrewRole};
use crate::models::cursor::{Page, PageRequest};
use crate::models::notification::NotificationKind;
use crate::AppState;
use serde_json::json;

fn crew_not_found() -> AppError {
    AppError::NotFound("Crew not found".to_string())
}

pub async fn get_crew(state: &AppState, crew_id: i64) -> Result<Crew, AppError> {
    state.db.get_crew(crew_id).await?.ok_or_else(crew_not_found)
}

pub async fn create_crew(
    state: &AppState,
    owner_id: i64,
    name: &str,
    description: Option<&str>,
) -> Result<Crew, AppError> {
    let crew = state
        .db
        .insert_crew(owner_id, name, description)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("Crew name '{name}' is taken")))?;

    tracing::info!(user_id = owner_id, crew_id = crew.id, "Crew created");
    Ok(crew)
}

pub async fn list_crews(state: &AppState, page: &PageRequest) -> Result<Page<Crew>, AppError> {
    let rows = state.db.list_crews(page).await?;
    Ok(Page::from_rows(rows, page))
}

pub async fn members(state: &AppState, crew_id: i64) -> Result<Vec<CrewMember>, AppError> {
    get_crew(state, crew_id).await?;
    state.db.list_crew_members(crew_id).await
}

pub async fn join(state: &AppState, user_id: i64, crew_id: i64) -> Result<(), AppError> {
    let crew = get_crew(state, crew_id).await?;

    if !state.db.join_crew(crew_id, user_id).await? {
        return Err(AppError::Conflict("Already a member".to_string()));
    }

    tracing::info!(user_id, crew_id, "Joined crew");
    state
        .notifications
        .notify(
            crew.owner_id,
            user_id,
            NotificationKind::CrewJoin,
            json!({ "crewId": crew_id, "userId": user_id }),
        )
        .await;
    Ok(())
}

/// Leave a crew. The owner cannot leave their own crew.
pub async fn leave(state: &AppState, user_id: i64, crew_id: i64) -> Result<(), AppError> {
    get_crew(state, crew_id).await?;

    match state.db.crew_role(crew_id, user_id).await? {
        Some(CrewRole::Owner) => {
            return Err(AppError::BadRequest("The owner cannot leave the crew".to_string()))
        }
        Some(CrewRole::Member) => {}
        None => return Err(AppError::NotFound("Not a member of this crew".to_string())),
    }

    if !state.db.leave_crew(crew_id, user_id).await? {
        return Err(AppError::NotFound("Not a member of this crew".to_string()));
    }
    tracing::info!(user_id, crew_id, "Left crew");
    Ok(())
}

// ─── Board ───────────────────────────────────────────────────

pub async fn board(
    state: &AppState,
    crew_id: i64,
    page: &PageRequest,
) -> Result<Page<BoardPostResponse>, AppError> {
    get_crew(state, crew_id).await?;
    let rows = state.db.list_board_posts(crew_id, page).await?;
    Ok(Page::from_rows(rows, page).map(BoardPostResponse::from))
}

pub async fn add_board_post(
    state: &AppState,
    user_id: i64,
    crew_id: i64,
    title: &str,
    content: &str,
) -> Result<BoardPostResponse, AppError> {
    get_crew(state, crew_id).await?;
    if state.db.crew_role(crew_id, user_id).await?.is_none() {
        return Err(AppError::Forbidden("Only crew members can post".to_string()));
    }

    let post = state
        .db
        .insert_board_post(crew_id, user_id, title, content)
        .await?;
    let author = state
        .db
        .get_active_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(BoardPostResponse {
        id: post.id,
        crew_id: post.crew_id,
        author: (&author).into(),
        title: post.title,
        content: post.content,
        created_at: post.created_at,
    })
}

/// Delete a board post. Allowed for its author and the crew owner.
pub async fn delete_board_post(
    state: &AppState,
    user_id: i64,
    crew_id: i64,
    post_id: i64,
) -> Result<(), AppError> {
    let crew = get_crew(state, crew_id).await?;
    let post = state
        .db
        .get_board_post(crew_id, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board post not found".to_string()))?;

    if post.author_id != user_id && crew.owner_id != user_id {
        return Err(AppError::Forbidden(
            "Not allowed to delete this board post".to_string(),
        ));
    }

    state.db.delete_board_post(post_id).await
}
