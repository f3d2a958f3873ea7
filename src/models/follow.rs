use serde::Serialize;
use uuid::Uuid;

/// Directed follow edge: `follower_id` follows `user_id`.
///
/// At most one edge exists per ordered pair; the database additionally
/// rejects edges where the two ids coincide.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Follow {
    pub user_id: Uuid,
    pub follower_id: Uuid,
}
