//! Follow-edge CRUD against Postgres.
//!
//! Uniqueness per ordered pair and the self-follow prohibition are also
//! enforced by table constraints; a violation slipping past the
//! orchestrator's checks surfaces as [`crate::error::AppError::Integrity`].

use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Follow;

pub async fn create(conn: &mut PgConnection, user_id: Uuid, follower_id: Uuid) -> Result<Follow> {
    let follow = sqlx::query_as::<_, Follow>(
        "INSERT INTO follows (user_id, follower_id)
         VALUES ($1, $2)
         RETURNING user_id, follower_id",
    )
    .bind(user_id)
    .bind(follower_id)
    .fetch_one(conn)
    .await?;

    Ok(follow)
}

pub async fn get(
    conn: &mut PgConnection,
    user_id: Uuid,
    follower_id: Uuid,
) -> Result<Option<Follow>> {
    let follow = sqlx::query_as::<_, Follow>(
        "SELECT user_id, follower_id FROM follows WHERE user_id = $1 AND follower_id = $2",
    )
    .bind(user_id)
    .bind(follower_id)
    .fetch_optional(conn)
    .await?;

    Ok(follow)
}

/// Remove the edge; reports whether a row was actually deleted.
pub async fn delete(conn: &mut PgConnection, user_id: Uuid, follower_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND follower_id = $2")
        .bind(user_id)
        .bind(follower_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Everyone following `user_id`
pub async fn list_followers(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Follow>> {
    let follows = sqlx::query_as::<_, Follow>(
        "SELECT user_id, follower_id FROM follows WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;

    Ok(follows)
}

/// Everyone `follower_id` is following
pub async fn list_following(conn: &mut PgConnection, follower_id: Uuid) -> Result<Vec<Follow>> {
    let follows = sqlx::query_as::<_, Follow>(
        "SELECT user_id, follower_id FROM follows WHERE follower_id = $1",
    )
    .bind(follower_id)
    .fetch_all(conn)
    .await?;

    Ok(follows)
}
