//! Social portal backend library
//!
//! Exports the core types and the router assembly for testing and reuse.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod permissions;
pub mod reactions;
pub mod routes;
pub mod security;

pub use config::Config;
pub use error::{AppError, Result};

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use reactions::RedisReactionStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub redis: ConnectionManager,
    pub config: Config,
}

impl AppState {
    /// Per-request handle onto the reaction store
    pub fn reaction_store(&self) -> RedisReactionStore {
        RedisReactionStore::new(self.redis.clone())
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health_check))
        .route("/auth/login", post(routes::login))
        .route("/user/registration", post(routes::register_user))
        .route("/user/update_profile", put(routes::update_profile))
        .route("/user/delete_account/:email", delete(routes::delete_account))
        .route("/user/restore_account/:email", post(routes::restore_account))
        .route("/user/:username", get(routes::get_user))
        .route(
            "/admin/admin_privilege",
            patch(routes::grant_admin_privilege).delete(routes::revoke_admin_privilege),
        )
        .route("/post/create", post(routes::create_post))
        .route("/post", put(routes::update_post))
        .route("/post/posts/:title", get(routes::list_posts_by_title))
        .route("/post/restore/:id", post(routes::restore_post))
        .route(
            "/post/:id/reaction/:kind",
            post(routes::add_reaction).delete(routes::remove_reaction),
        )
        .route("/post/:id/reactions", delete(routes::clear_reactions))
        .route("/post/:id", get(routes::get_post).delete(routes::delete_post))
        .route("/follow/followers", get(routes::list_followers))
        .route("/follow/following", get(routes::list_following))
        .route("/follow/status", get(routes::follow_status))
        .route(
            "/follow/:username",
            post(routes::follow_user).delete(routes::unfollow_user),
        )
        .with_state(state)
}
