use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::constants::ERR_SELF_PRIVILEGE;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::{ShowAdmin, User};
use crate::security::AuthUser;
use crate::AppState;

/// Query parameters for the privilege-management endpoints
#[derive(Debug, Deserialize)]
pub struct PrivilegeQuery {
    pub user_id: Uuid,
}

/// Both endpoints are strictly superadmin-only and never act on self.
fn check_privilege_request(current_user: &User, target_id: Uuid) -> Result<()> {
    if !current_user.is_superadmin() {
        tracing::warn!("Privilege change attempt by non-superadmin {}", current_user.id);
        return Err(AppError::Forbidden);
    }
    if current_user.id == target_id {
        return Err(AppError::Validation(ERR_SELF_PRIVILEGE.to_string()));
    }
    Ok(())
}

/// Grant admin rights to a user
pub async fn grant_admin_privilege(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Query(params): Query<PrivilegeQuery>,
) -> Result<Json<ShowAdmin>> {
    check_privilege_request(&current_user, params.user_id)?;

    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_id(&mut conn, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {}", params.user_id)))?;
    drop(conn);

    if target.is_admin() || target.is_superadmin() {
        return Err(AppError::Conflict(format!(
            "User {} already promoted to admin / superadmin.",
            params.user_id
        )));
    }

    let mut tx = state.pool.begin().await?;
    let updated = db::users::set_roles(&mut tx, target.id, &target.roles_with_admin())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {}", params.user_id)))?;
    tx.commit().await?;

    tracing::info!("Admin privilege granted to user {}", updated.id);

    Ok(Json(ShowAdmin::from(&updated)))
}

/// Revoke admin rights from a user
pub async fn revoke_admin_privilege(
    State(state): State<AppState>,
    AuthUser(current_user): AuthUser,
    Query(params): Query<PrivilegeQuery>,
) -> Result<Json<ShowAdmin>> {
    check_privilege_request(&current_user, params.user_id)?;

    let mut conn = state.pool.acquire().await?;
    let target = db::users::get_by_id(&mut conn, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {}", params.user_id)))?;
    drop(conn);

    // The superadmin tag is not removable through this path.
    if target.is_superadmin() {
        return Err(AppError::Conflict(format!(
            "User with id {} is a superadmin.",
            params.user_id
        )));
    }
    if !target.is_admin() {
        return Err(AppError::Conflict(format!(
            "User with id {} has no admin privileges.",
            params.user_id
        )));
    }

    let mut tx = state.pool.begin().await?;
    let updated = db::users::set_roles(&mut tx, target.id, &User::roles_without_privileges())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {}", params.user_id)))?;
    tx.commit().await?;

    tracing::info!("Admin privilege revoked from user {}", updated.id);

    Ok(Json(ShowAdmin::from(&updated)))
}
