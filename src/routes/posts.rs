use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::constants::ERR_MISSING_FIELDS;
use crate::db::{self, posts::PostChanges};
use crate::error::{AppError, Result};
use crate::models::ShowPost;
use crate::reactions::{self, Kind};
use crate::security::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub id: i32,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub detail: String,
}

/// Create a post owned by the authenticated user
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<ShowPost>)> {
    if payload.title.is_empty() || payload.content.is_empty() {
        return Err(AppError::Validation(ERR_MISSING_FIELDS.to_string()));
    }

    let mut tx = state.pool.begin().await?;
    let post = db::posts::create(&mut tx, &payload.title, &payload.content, current_user.id)
        .await?;
    tx.commit().await?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich(&mut store, &post).await?;

    Ok((StatusCode::CREATED, Json(enriched)))
}

/// Get a post by id, enriched with live reaction counts
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i32>,
) -> Result<Json<ShowPost>> {
    let mut conn = state.pool.acquire().await?;
    let post = db::posts::get_by_id(&mut conn, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich(&mut store, &post).await?;

    Ok(Json(enriched))
}

/// List every published post with the given title
pub async fn list_posts_by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<ShowPost>>> {
    let mut conn = state.pool.acquire().await?;
    let posts = db::posts::list_by_title(&mut conn, &title).await?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich_all(&mut store, &posts).await?;

    Ok(Json(enriched))
}

/// Update a post; only the owner may mutate it
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<ShowPost>> {
    let changes = PostChanges {
        title: payload.title,
        content: payload.content,
    };
    if changes.is_empty() {
        return Err(AppError::Validation(ERR_MISSING_FIELDS.to_string()));
    }

    let mut conn = state.pool.acquire().await?;
    let post = db::posts::get_by_id(&mut conn, payload.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {}", payload.id)))?;
    drop(conn);

    if post.owner_id != current_user.id {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.pool.begin().await?;
    let updated = db::posts::update(&mut tx, post.id, current_user.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {}", payload.id)))?;
    tx.commit().await?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich(&mut store, &updated).await?;

    Ok(Json(enriched))
}

/// Soft-delete a post, returning the deleted representation
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<ShowPost>> {
    let mut conn = state.pool.acquire().await?;
    let post = db::posts::get_by_id(&mut conn, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    drop(conn);

    if post.owner_id != current_user.id {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.pool.begin().await?;
    let deleted = db::posts::soft_delete(&mut tx, post_id, current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    tx.commit().await?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich(&mut store, &deleted).await?;

    Ok(Json(enriched))
}

/// Restore a soft-deleted post; restore of a published post is "not found"
pub async fn restore_post(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<ShowPost>> {
    let mut tx = state.pool.begin().await?;
    let restored = db::posts::restore(&mut tx, post_id, current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    tx.commit().await?;

    let mut store = state.reaction_store();
    let enriched = reactions::enrich(&mut store, &restored).await?;

    Ok(Json(enriched))
}

/// Apply a reaction, replacing the opposite one if held
pub async fn add_reaction(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path((post_id, kind)): Path<(i32, Kind)>,
) -> Result<(StatusCode, Json<ReactionResponse>)> {
    let mut conn = state.pool.acquire().await?;
    db::posts::get_by_id(&mut conn, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    drop(conn);

    let mut store = state.reaction_store();
    reactions::apply(&mut store, post_id, current_user.id, kind).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReactionResponse {
            detail: format!(
                "Reaction {} was added to post with id {post_id}",
                kind.as_str()
            ),
        }),
    ))
}

/// Remove a reaction; removing a non-existent one is a no-op
pub async fn remove_reaction(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path((post_id, kind)): Path<(i32, Kind)>,
) -> Result<Json<ReactionResponse>> {
    let mut conn = state.pool.acquire().await?;
    db::posts::get_by_id(&mut conn, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    drop(conn);

    let mut store = state.reaction_store();
    reactions::remove(&mut store, post_id, current_user.id, kind).await?;

    Ok(Json(ReactionResponse {
        detail: format!(
            "Reaction {} removed from post with id {post_id}",
            kind.as_str()
        ),
    }))
}

/// Clear the caller's reactions of every kind on the post
pub async fn clear_reactions(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(post_id): Path<i32>,
) -> Result<Json<ReactionResponse>> {
    let mut conn = state.pool.acquire().await?;
    db::posts::get_by_id(&mut conn, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post with id {post_id}")))?;
    drop(conn);

    let mut store = state.reaction_store();
    reactions::clear(&mut store, post_id, current_user.id).await?;

    Ok(Json(ReactionResponse {
        detail: format!("Reactions removed from post with id {post_id}"),
    }))
}
