use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Reaction store error: {0}")]
    Reactions(#[from] redis::RedisError),

    #[error("Password hashing error")]
    Hash,

    #[error("{0} not found.")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Forbidden.")]
    Forbidden,

    #[error("Superadmin cannot be deleted via API.")]
    SuperadminImmutable,

    #[error("{0}")]
    Validation(String),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Bad request")]
    Integrity,
}

/// Downgrade uniqueness-constraint violations to a generic bad request.
///
/// A unique violation firing at insert/update time means another request
/// won the race after our existence check passed; callers must see a 4xx,
/// never a raw store error.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Integrity,
            err => AppError::Database(err),
        }
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(_: argon2::password_hash::Error) -> Self {
        AppError::Hash
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized
    }
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Reactions(ref e) => {
                tracing::error!("Reaction store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Hash => {
                tracing::error!("Password hashing error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found.")),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden.".to_string()),
            AppError::SuperadminImmutable => (
                StatusCode::NOT_ACCEPTABLE,
                "Superadmin cannot be deleted via API.".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Unauthorized => {
                let body = Json(json!({ "error": "Could not validate credentials" }));
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    body,
                )
                    .into_response();
            }
            AppError::Integrity => (StatusCode::BAD_REQUEST, "Bad request".to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
