use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{AppError, Result};
use crate::security::{create_access_token, Hasher};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let mut conn = state.pool.acquire().await.map_err(AppError::from)?;

    let user = db::users::get_by_email(&mut conn, &payload.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !Hasher::verify_password(&payload.password, &user.password) {
        tracing::warn!("Failed login attempt for {}", payload.email);
        return Err(AppError::Unauthorized);
    }

    let access_token = create_access_token(
        &user.email,
        &state.config.jwt_secret,
        state.config.token_expire_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
