//! Redis-backed reaction store.
//!
//! One set per (post, kind) pair; members are user-id strings. Multi-key
//! removal goes through an atomic pipeline, which guarantees ordering of
//! the batched commands but not isolation from concurrent writers.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use uuid::Uuid;

use super::{reaction_key, Kind, ReactionCounts, ReactionStore};
use crate::error::Result;

/// Connect to Redis and return a reconnecting connection manager
pub async fn init_redis(redis_url: &str) -> std::result::Result<ConnectionManager, redis::RedisError> {
    tracing::info!("Connecting to reaction store...");

    let client = Client::open(redis_url)?;
    let manager = client.get_connection_manager().await?;

    tracing::info!("Reaction store connection established");

    Ok(manager)
}

/// Reaction store over a shared Redis connection manager
#[derive(Clone)]
pub struct RedisReactionStore {
    conn: ConnectionManager,
}

impl RedisReactionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReactionStore for RedisReactionStore {
    async fn add(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()> {
        let _: () = self
            .conn
            .sadd(reaction_key(post_id, kind), user_id.to_string())
            .await?;
        Ok(())
    }

    async fn remove(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<()> {
        let _: () = self
            .conn
            .srem(reaction_key(post_id, kind), user_id.to_string())
            .await?;
        Ok(())
    }

    async fn remove_all(&mut self, post_id: i32, user_id: Uuid) -> Result<()> {
        let member = user_id.to_string();
        let mut pipe = redis::pipe();
        pipe.atomic();
        for kind in Kind::ALL {
            pipe.srem(reaction_key(post_id, kind), &member).ignore();
        }
        let _: () = pipe.query_async(&mut self.conn).await?;
        Ok(())
    }

    async fn counts(&mut self, post_id: i32) -> Result<ReactionCounts> {
        let mut counts = ReactionCounts::default();
        for kind in Kind::ALL {
            let n: u64 = self.conn.scard(reaction_key(post_id, kind)).await?;
            counts.set(kind, n);
        }
        Ok(counts)
    }

    async fn is_member(&mut self, post_id: i32, user_id: Uuid, kind: Kind) -> Result<bool> {
        let member: bool = self
            .conn
            .sismember(reaction_key(post_id, kind), user_id.to_string())
            .await?;
        Ok(member)
    }
}
