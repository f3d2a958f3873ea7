//! User CRUD against Postgres.
//!
//! Every query is scoped to `is_active = TRUE` except restore, which
//! requires the flag to be currently false. "Not found" is `Ok(None)`;
//! callers decide what that means.

use sqlx::{PgConnection, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::models::User;

/// Fields for a new user row
pub struct NewUser<'a> {
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub hashed_password: &'a str,
    pub roles: Vec<String>,
}

/// Optional fields for a profile update
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}

pub async fn create(conn: &mut PgConnection, new_user: NewUser<'_>) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, first_name, last_name, email, password, is_active, roles)
         VALUES ($1, $2, $3, $4, $5, TRUE, $6)
         RETURNING *",
    )
    .bind(new_user.username)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .bind(new_user.email)
    .bind(new_user.hashed_password)
    .bind(&new_user.roles)
    .fetch_one(conn)
    .await?;

    Ok(user)
}

pub async fn get_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = TRUE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

pub async fn get_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 AND is_active = TRUE")
            .bind(email)
            .fetch_optional(conn)
            .await?;

    Ok(user)
}

pub async fn get_by_username(conn: &mut PgConnection, username: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1 AND is_active = TRUE")
            .bind(username)
            .fetch_optional(conn)
            .await?;

    Ok(user)
}

/// Partial profile update; always stamps `updated_at`.
pub async fn update(
    conn: &mut PgConnection,
    user_id: Uuid,
    changes: &UserChanges,
) -> Result<Option<User>> {
    let mut query = QueryBuilder::new("UPDATE users SET updated_at = now()");
    if let Some(username) = &changes.username {
        query.push(", username = ").push_bind(username);
    }
    if let Some(first_name) = &changes.first_name {
        query.push(", first_name = ").push_bind(first_name);
    }
    if let Some(last_name) = &changes.last_name {
        query.push(", last_name = ").push_bind(last_name);
    }
    query
        .push(" WHERE id = ")
        .push_bind(user_id)
        .push(" AND is_active = TRUE RETURNING *");

    let user = query
        .build_query_as::<User>()
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Replace the role tag set (privilege grant/revoke)
pub async fn set_roles(
    conn: &mut PgConnection,
    user_id: Uuid,
    roles: &[String],
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET roles = $2, updated_at = now()
         WHERE id = $1 AND is_active = TRUE
         RETURNING *",
    )
    .bind(user_id)
    .bind(roles)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

pub async fn soft_delete_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_active = FALSE, updated_at = now()
         WHERE email = $1 AND is_active = TRUE
         RETURNING *",
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

pub async fn restore_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "UPDATE users SET is_active = TRUE, updated_at = now()
         WHERE email = $1 AND is_active = FALSE
         RETURNING *",
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}
