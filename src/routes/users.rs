use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::constants::{ERR_DUPLICATE_USER, ERR_MISSING_FIELDS, MAX_FIELD_LEN, MIN_PASSWORD_LEN};
use crate::db::{
    self,
    users::{NewUser, UserChanges},
};
use crate::error::{AppError, Result};
use crate::models::{Role, ShowUser};
use crate::permissions::{can_manage, require, AccountAction};
use crate::security::{AuthUser, Hasher};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Email of the account to update; non-self targets are gated by the
    /// authorization hierarchy.
    pub email: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.username.is_empty()
        || payload.first_name.is_empty()
        || payload.last_name.is_empty()
    {
        return Err(AppError::Validation(ERR_MISSING_FIELDS.to_string()));
    }
    if [
        &payload.username,
        &payload.first_name,
        &payload.last_name,
        &payload.email,
    ]
    .iter()
    .any(|f| f.len() > MAX_FIELD_LEN)
    {
        return Err(AppError::Validation("Field too long".to_string()));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Invalid email".to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Register a new user with the base USER role
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ShowUser>)> {
    validate_registration(&payload)?;

    let hashed_password = Hasher::hash_password(&payload.password)?;

    let mut tx = state.pool.begin().await?;
    let created = db::users::create(
        &mut tx,
        NewUser {
            username: &payload.username,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            email: &payload.email,
            hashed_password: &hashed_password,
            roles: vec![Role::User.as_str().to_string()],
        },
    )
    .await;

    let user = match created {
        Ok(user) => user,
        Err(AppError::Integrity) => {
            tracing::warn!("Registration rejected: duplicate username or email");
            return Err(AppError::Conflict(ERR_DUPLICATE_USER.to_string()));
        }
        Err(err) => return Err(err),
    };
    tx.commit().await?;

    tracing::info!("New user registered: {}", user.username);

    Ok((StatusCode::CREATED, Json(ShowUser::from(&user))))
}

/// Get a public profile by username
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ShowUser>> {
    let mut conn = state.pool.acquire().await?;

    let user = db::users::get_by_username(&mut conn, &username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with username {username}")))?;

    Ok(Json(ShowUser::from(&user)))
}

/// Update a profile; non-self targets require management rights
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ShowUser>> {
    let changes = UserChanges {
        username: payload.username,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };
    if changes.is_empty() {
        return Err(AppError::Validation(ERR_MISSING_FIELDS.to_string()));
    }

    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_email(&mut conn, &payload.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {}", payload.email)))?;
    drop(conn);

    if target.id != current_user.id {
        require(can_manage(&current_user, &target, AccountAction::Update))?;
    }

    let mut tx = state.pool.begin().await?;
    let updated = db::users::update(&mut tx, target.id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {}", payload.email)))?;
    tx.commit().await?;

    Ok(Json(ShowUser::from(&updated)))
}

/// Soft-delete an account, returning the deleted representation
pub async fn delete_account(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(email): Path<String>,
) -> Result<Json<ShowUser>> {
    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_email(&mut conn, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {email}")))?;
    drop(conn);

    require(can_manage(&current_user, &target, AccountAction::Delete))?;

    let mut tx = state.pool.begin().await?;
    let deleted = db::users::soft_delete_by_email(&mut tx, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {email}")))?;
    tx.commit().await?;

    tracing::info!("User account deactivated: {}", deleted.username);

    Ok(Json(ShowUser::from(&deleted)))
}

/// Restore a soft-deleted account (admin or superadmin only)
pub async fn restore_account(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Path(email): Path<String>,
) -> Result<Json<ShowUser>> {
    if !current_user.is_admin() && !current_user.is_superadmin() {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.pool.begin().await?;
    let restored = db::users::restore_by_email(&mut tx, &email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with email {email}")))?;
    tx.commit().await?;

    tracing::info!("User account restored: {}", restored.username);

    Ok(Json(ShowUser::from(&restored)))
}
