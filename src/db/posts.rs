//! Post CRUD against Postgres.
//!
//! Reads and mutations are scoped to `is_published = TRUE`; mutations are
//! additionally scoped to the owning user.

use sqlx::{PgConnection, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Post;

/// Optional fields for a post update
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

pub async fn create(
    conn: &mut PgConnection,
    title: &str,
    content: &str,
    owner_id: Uuid,
) -> Result<Post> {
    let post = sqlx::query_as::<_, Post>(
        "INSERT INTO posts (title, content, is_published, owner_id)
         VALUES ($1, $2, TRUE, $3)
         RETURNING *",
    )
    .bind(title)
    .bind(content)
    .bind(owner_id)
    .fetch_one(conn)
    .await?;

    Ok(post)
}

pub async fn get_by_id(conn: &mut PgConnection, post_id: i32) -> Result<Option<Post>> {
    let post =
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1 AND is_published = TRUE")
            .bind(post_id)
            .fetch_optional(conn)
            .await?;

    Ok(post)
}

pub async fn list_by_title(conn: &mut PgConnection, title: &str) -> Result<Vec<Post>> {
    let posts =
        sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE title = $1 AND is_published = TRUE")
            .bind(title)
            .fetch_all(conn)
            .await?;

    Ok(posts)
}

/// Owner-scoped partial update; always stamps `updated_at`.
pub async fn update(
    conn: &mut PgConnection,
    post_id: i32,
    owner_id: Uuid,
    changes: &PostChanges,
) -> Result<Option<Post>> {
    let mut query = QueryBuilder::new("UPDATE posts SET updated_at = now()");
    if let Some(title) = &changes.title {
        query.push(", title = ").push_bind(title);
    }
    if let Some(content) = &changes.content {
        query.push(", content = ").push_bind(content);
    }
    query
        .push(" WHERE id = ")
        .push_bind(post_id)
        .push(" AND owner_id = ")
        .push_bind(owner_id)
        .push(" AND is_published = TRUE RETURNING *");

    let post = query
        .build_query_as::<Post>()
        .fetch_optional(conn)
        .await?;

    Ok(post)
}

pub async fn soft_delete(
    conn: &mut PgConnection,
    post_id: i32,
    owner_id: Uuid,
) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(
        "UPDATE posts SET is_published = FALSE, updated_at = now()
         WHERE id = $1 AND owner_id = $2 AND is_published = TRUE
         RETURNING *",
    )
    .bind(post_id)
    .bind(owner_id)
    .fetch_optional(conn)
    .await?;

    Ok(post)
}

pub async fn restore(
    conn: &mut PgConnection,
    post_id: i32,
    owner_id: Uuid,
) -> Result<Option<Post>> {
    let post = sqlx::query_as::<_, Post>(
        "UPDATE posts SET is_published = TRUE, updated_at = now()
         WHERE id = $1 AND owner_id = $2 AND is_published = FALSE
         RETURNING *",
    )
    .bind(post_id)
    .bind(owner_id)
    .fetch_optional(conn)
    .await?;

    Ok(post)
}
