//! Password hashing, bearer tokens and the authenticated-user extractor.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::AppState;

/// One-way password hashing with Argon2id
pub struct Hasher;

impl Hasher {
    pub fn hash_password(plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)?
            .to_string();
        Ok(hash)
    }

    pub fn verify_password(plain: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Bearer token claims; `sub` is the user's email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub fn create_access_token(email: &str, secret: &str, expire_minutes: i64) -> Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now() + Duration::minutes(expire_minutes)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}

/// Authenticated user resolved from the Authorization header.
///
/// Token verification alone is not enough: the subject must still resolve
/// to an active user row, so soft-deleted accounts lose access immediately.
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_access_token(token, &state.config.jwt_secret)?;

        let mut conn = state.pool.acquire().await.map_err(AppError::from)?;
        let user = db::users::get_by_email(&mut conn, &claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = Hasher::hash_password("correct horse battery").unwrap();
        assert!(Hasher::verify_password("correct horse battery", &hash));
        assert!(!Hasher::verify_password("wrong password", &hash));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!Hasher::verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_roundtrip() {
        let token = create_access_token("a@example.com", "secret", 60).unwrap();
        let claims = verify_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "a@example.com");
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = create_access_token("a@example.com", "secret", 60).unwrap();
        assert!(verify_access_token(&token, "other-secret").is_err());
    }
}
