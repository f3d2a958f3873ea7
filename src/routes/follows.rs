use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{AppError, Result};
use crate::models::Follow;
use crate::security::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FollowStatusQuery {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct FollowStatusResponse {
    pub following: bool,
    pub detail: String,
}

/// Follow a user by username
pub async fn follow_user(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(username): Path<String>,
) -> Result<(StatusCode, Json<FollowResponse>)> {
    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_username(&mut conn, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with username {username}")))?;
    drop(conn);

    if target.id == current_user.id {
        tracing::warn!("Self-follow attempt by user {}", current_user.id);
        return Err(AppError::Forbidden);
    }

    // The unique constraint on (user_id, follower_id) backs this check up:
    // losing the race to a concurrent insert surfaces as a 400, not a 500.
    let mut tx = state.pool.begin().await?;
    if db::follows::get(&mut tx, target.id, current_user.id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "You are already following user {username}"
        )));
    }
    db::follows::create(&mut tx, target.id, current_user.id).await?;
    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(FollowResponse {
            detail: format!("You are following user {username}"),
        }),
    ))
}

/// Unfollow a user; absence of the edge is "not found", never silent
pub async fn unfollow_user(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<FollowResponse>> {
    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_username(&mut conn, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with username {username}")))?;

    let deleted = db::follows::delete(&mut conn, target.id, current_user.id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("Follow of user {username}")));
    }

    Ok(Json(FollowResponse {
        detail: format!("You are unfollowing user {username}"),
    }))
}

/// Report whether the caller follows the given user
pub async fn follow_status(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Query(params): Query<FollowStatusQuery>,
) -> Result<Json<FollowStatusResponse>> {
    let username = &params.username;

    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_username(&mut conn, username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with username {username}")))?;

    let following = db::follows::get(&mut conn, target.id, current_user.id)
        .await?
        .is_some();

    let detail = if following {
        format!("You are following user {username}")
    } else {
        format!("You are not following user {username}")
    };

    Ok(Json(FollowStatusResponse { following, detail }))
}

/// Everyone following the caller
pub async fn list_followers(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
) -> Result<Json<Vec<Follow>>> {
    let mut conn = state.pool.acquire().await?;
    let followers = db::follows::list_followers(&mut conn, current_user.id).await?;

    Ok(Json(followers))
}

/// Everyone the caller is following
pub async fn list_following(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
) -> Result<Json<Vec<Follow>>> {
    let mut conn = state.pool.acquire().await?;
    let following = db::follows::list_following(&mut conn, current_user.id).await?;

    Ok(Json(following))
}
