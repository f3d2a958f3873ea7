//! Per-post like/dislike membership, kept in a secondary key-value store.
//!
//! Postgres owns users, posts and follows durably; the reaction store is a
//! derived, rebuildable cache of set membership. Orchestration here
//! enforces mutual exclusivity between opposing reactions and idempotent
//! toggling. Two concurrent opposite reactions from the same user can
//! transiently land in both sets; that window is bounded and self-healing
//! (the next reaction call clears it), so it is accepted rather than
//! solved with cross-store locking.

pub mod redis;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Post, ShowPost};

pub use self::redis::RedisReactionStore;

/// Reaction kind, mutually exclusive per (user, post)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Like,
    Dislike,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Like, Kind::Dislike];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Like => "like",
            Kind::Dislike => "dislike",
        }
    }

    pub fn opposite(self) -> Kind {
        match self {
            Kind::Like => Kind::Dislike,
            Kind::Dislike => Kind::Like,
        }
    }
}

/// Key of the membership set for one (post, kind) pair
pub fn reaction_key(post_id: i32, kind: Kind) -> String {
    format!("Post:{post_id} Reaction:{}", kind.as_str())
}

/// Live reaction counts for a post; always covers every declared kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCounts {
    pub like: u64,
    pub dislike: u64,
}

impl ReactionCounts {
    pub fn get(&self, kind: Kind) -> u64 {
        match kind {
            Kind::Like => self.like,
            Kind::Dislike => self.dislike,
        }
    }

    pub fn set(&mut self, kind: Kind, count: u64) {
        match kind {
            Kind::Like => self.like = count,
            Kind::Dislike => self.dislike = count,
        }
    }
}

/// Set-membership operations against the key-value store
#[async_trait]
pub trait ReactionStore: Send {
    /// Add the user to the set for (post, kind); observably idempotent.
    async fn add(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()>;

    /// Discard the user from the set; silent no-op when absent.
    async fn remove(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()>;

    /// Remove the user from every kind's set for the post in one batch.
    async fn remove_all(&mut self, post_id: i32, user_id: Uuid) -> Result<()>;

    /// Cardinality of each kind's set, zero when empty.
    async fn counts(&mut self, post_id: i32) -> Result<ReactionCounts>;

    /// Existence probe.
    async fn is_member(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<bool>;
}

/// Apply a reaction, clearing the opposite one first.
///
/// The check-then-clear-then-add sequence keeps like and dislike mutually
/// exclusive without locking; callers verify the post exists beforehand.
pub async fn apply<S>(store: &mut S, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()>
where
    S: ReactionStore + ?Sized,
{
    if store.is_member(post_id, user_id, kind.opposite()).await? {
        store.remove(post_id, user_id, kind.opposite()).await?;
    }
    store.add(post_id, user_id, kind).await
}

/// Remove a reaction; removing a non-existent membership is a no-op.
pub async fn remove<S>(store: &mut S, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()>
where
    S: ReactionStore + ?Sized,
{
    store.remove(post_id, user_id, kind).await
}

/// Clear the user's membership for every kind on the post.
pub async fn clear<S>(store: &mut S, post_id: i32, user_id: Uuid) -> Result<()>
where
    S: ReactionStore + ?Sized,
{
    store.remove_all(post_id, user_id).await
}

/// Attach live reaction counts to a post's external representation.
pub async fn enrich<S>(store: &mut S, post: &Post) -> Result<ShowPost>
where
    S: ReactionStore + ?Sized,
{
    let counts = store.counts(post.id).await?;
    Ok(ShowPost::from_post(post, counts))
}

/// Enrich a batch of posts, preserving order.
pub async fn enrich_all<S>(store: &mut S, posts: &[Post]) -> Result<Vec<ShowPost>>
where
    S: ReactionStore + ?Sized,
{
    let mut enriched = Vec::with_capacity(posts.len());
    for post in posts {
        enriched.push(enrich(store, post).await?);
    }
    Ok(enriched)
}
