use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::reactions::ReactionCounts;

/// Post row as stored in Postgres
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// External post representation, enriched with live reaction counts
#[derive(Debug, Clone, Serialize)]
pub struct ShowPost {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reactions: ReactionCounts,
}

impl ShowPost {
    pub fn from_post(post: &Post, reactions: ReactionCounts) -> Self {
        ShowPost {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            is_published: post.is_published,
            owner_id: post.owner_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            reactions,
        }
    }
}
