//! Integration tests for the social portal API
//!
//! These tests exercise the complete request/response cycle against live
//! Postgres and Redis instances. They are skipped unless both
//! `DATABASE_URL` and `REDIS_URL` are set.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const TEST_JWT_SECRET: &str = "test-secret-key";

// =============================================================================
// Test Helpers
// =============================================================================

fn test_config(database_url: &str, redis_url: &str) -> social_portal_server::Config {
    social_portal_server::Config {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: database_url.to_string(),
        redis_url: redis_url.to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        token_expire_minutes: 60,
        environment: "test".to_string(),
    }
}

/// Build application state against the live stores, or None when they are
/// not configured (the test is then skipped).
async fn test_state() -> Option<social_portal_server::AppState> {
    let (Ok(database_url), Ok(redis_url)) =
        (std::env::var("DATABASE_URL"), std::env::var("REDIS_URL"))
    else {
        eprintln!("skipping: DATABASE_URL and REDIS_URL must be set for API tests");
        return None;
    };

    let config = test_config(&database_url, &redis_url);
    let pool = social_portal_server::db::create_pool(&database_url)
        .await
        .expect("Failed to create test pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    let redis = social_portal_server::reactions::redis::init_redis(&redis_url)
        .await
        .expect("Failed to connect to test redis");

    Some(social_portal_server::AppState {
        pool,
        redis,
        config,
    })
}

async fn test_app() -> Option<Router> {
    Some(social_portal_server::app(test_state().await?))
}

/// Unique suffix so repeated runs never collide on unique columns
fn unique() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{nanos}")
}

async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Register a fresh user and return (username, email, password)
async fn register_user(app: &Router) -> (String, String, String) {
    let suffix = unique();
    let username = format!("user{suffix}");
    let email = format!("user{suffix}@example.com");
    let password = "password123".to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/user/registration",
            json!({
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": password,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    (username, email, password)
}

/// Log a user in and return the bearer token
async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    body["access_token"].as_str().unwrap().to_string()
}

/// Create a post and return its id
async fn create_post(app: &Router, token: &str, title: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/post/create",
            token,
            Some(json!({ "title": title, "content": "some content" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_to_json(response.into_body()).await;
    body["id"].as_i64().unwrap()
}

async fn get_post_reactions(app: &Router, post_id: i64) -> Value {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/post/{post_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    body["reactions"].clone()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let Some(app) = test_app().await else { return };

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_registration_and_duplicate_conflict() {
    let Some(app) = test_app().await else { return };

    let (username, email, _) = register_user(&app).await;

    // profile is publicly readable
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/user/{username}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["email"], email);
    assert_eq!(body["is_active"], true);

    // registering the same username/email again conflicts
    let response = app
        .oneshot(json_request(
            "POST",
            "/user/registration",
            json!({
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "email": email,
                "password": "password123",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_rejects_short_password() {
    let Some(app) = test_app().await else { return };

    let suffix = unique();
    let response = app
        .oneshot(json_request(
            "POST",
            "/user/registration",
            json!({
                "username": format!("user{suffix}"),
                "first_name": "Test",
                "last_name": "User",
                "email": format!("user{suffix}@example.com"),
                "password": "short",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let Some(app) = test_app().await else { return };

    let (_, email, _) = register_user(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": "wrong password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_rejects_empty_payload() {
    let Some(app) = test_app().await else { return };

    let (_, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;

    let response = app
        .oneshot(authed_request(
            "PUT",
            "/user/update_profile",
            &token,
            Some(json!({ "email": email })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_own_profile() {
    let Some(app) = test_app().await else { return };

    let (_, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;

    let response = app
        .oneshot(authed_request(
            "PUT",
            "/user/update_profile",
            &token,
            Some(json!({ "email": email, "first_name": "Renamed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["first_name"], "Renamed");
}

#[tokio::test]
async fn test_plain_user_cannot_delete_another_account() {
    let Some(app) = test_app().await else { return };

    let (_, email_a, password_a) = register_user(&app).await;
    let (_, email_b, _) = register_user(&app).await;
    let token_a = login(&app, &email_a, &password_a).await;

    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/user/delete_account/{email_b}"),
            &token_a,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_self_delete_deactivates_account() {
    let Some(app) = test_app().await else { return };

    let (username, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/user/delete_account/{email}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["is_active"], false);

    // the soft-deleted profile is no longer readable
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/user/{username}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_privilege_requires_superadmin() {
    let Some(app) = test_app().await else { return };

    let (_, email_a, password_a) = register_user(&app).await;
    let token_a = login(&app, &email_a, &password_a).await;

    // a plain user is rejected before the target is even resolved
    let response = app
        .oneshot(authed_request(
            "PATCH",
            "/admin/admin_privilege?user_id=00000000-0000-0000-0000-000000000000",
            &token_a,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_privilege_grant_and_revoke_guards() {
    let Some(state) = test_state().await else { return };
    let app = social_portal_server::app(state.clone());

    let (_, email_root, password_root) = register_user(&app).await;
    let (username_target, _, _) = register_user(&app).await;

    // promote the first user to superadmin directly in the store
    let mut conn = state.pool.acquire().await.unwrap();
    let root = social_portal_server::db::users::get_by_email(&mut conn, &email_root)
        .await
        .unwrap()
        .unwrap();
    social_portal_server::db::users::set_roles(
        &mut conn,
        root.id,
        &["USER".to_string(), "SUPERADMIN".to_string()],
    )
    .await
    .unwrap()
    .unwrap();
    let target = social_portal_server::db::users::get_by_username(&mut conn, &username_target)
        .await
        .unwrap()
        .unwrap();
    drop(conn);

    let token = login(&app, &email_root, &password_root).await;

    // a superadmin cannot manage its own privileges
    let response = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/admin/admin_privilege?user_id={}", root.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // revoking from a user who was never promoted conflicts
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/admin/admin_privilege?user_id={}", target.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // grant succeeds and reports the new tag
    let response = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/admin/admin_privilege?user_id={}", target.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(body["roles"]
        .as_array()
        .unwrap()
        .contains(&json!("ADMIN")));

    // granting to an already-privileged target conflicts
    let response = app
        .clone()
        .oneshot(authed_request(
            "PATCH",
            &format!("/admin/admin_privilege?user_id={}", target.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // revoke strips the tag
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/admin/admin_privilege?user_id={}", target.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(!body["roles"]
        .as_array()
        .unwrap()
        .contains(&json!("ADMIN")));

    // the superadmin tag is not removable through this path
    let mut conn = state.pool.acquire().await.unwrap();
    social_portal_server::db::users::set_roles(
        &mut conn,
        target.id,
        &["USER".to_string(), "SUPERADMIN".to_string()],
    )
    .await
    .unwrap()
    .unwrap();
    drop(conn);

    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/admin/admin_privilege?user_id={}", target.id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reaction_toggle_flow() {
    let Some(app) = test_app().await else { return };

    let (_, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;
    let post_id = create_post(&app, &token, &format!("reactions-{}", unique())).await;

    // like -> {1, 0}
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/post/{post_id}/reaction/like"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        get_post_reactions(&app, post_id).await,
        json!({ "like": 1, "dislike": 0 })
    );

    // like again is idempotent
    app.clone()
        .oneshot(authed_request(
            "POST",
            &format!("/post/{post_id}/reaction/like"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        get_post_reactions(&app, post_id).await,
        json!({ "like": 1, "dislike": 0 })
    );

    // dislike replaces like -> {0, 1}
    app.clone()
        .oneshot(authed_request(
            "POST",
            &format!("/post/{post_id}/reaction/dislike"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        get_post_reactions(&app, post_id).await,
        json!({ "like": 0, "dislike": 1 })
    );

    // removing a reaction that is not held is a no-op
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/post/{post_id}/reaction/like"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_post_reactions(&app, post_id).await,
        json!({ "like": 0, "dislike": 1 })
    );

    // clearing removes every kind
    app.clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/post/{post_id}/reactions"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(
        get_post_reactions(&app, post_id).await,
        json!({ "like": 0, "dislike": 0 })
    );
}

#[tokio::test]
async fn test_post_soft_delete_and_restore() {
    let Some(app) = test_app().await else { return };

    let (_, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;
    let post_id = create_post(&app, &token, &format!("lifecycle-{}", unique())).await;

    // delete returns the (now unpublished) representation
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/post/{post_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["is_published"], false);

    // reads no longer see it
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/post/{post_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // restore brings it back
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/post/restore/{post_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // restoring a published post is "not found"
    let response = app
        .oneshot(authed_request(
            "POST",
            &format!("/post/restore/{post_id}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_mutation_is_owner_only() {
    let Some(app) = test_app().await else { return };

    let (_, email_a, password_a) = register_user(&app).await;
    let (_, email_b, password_b) = register_user(&app).await;
    let token_a = login(&app, &email_a, &password_a).await;
    let token_b = login(&app, &email_b, &password_b).await;
    let post_id = create_post(&app, &token_a, &format!("owned-{}", unique())).await;

    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/post/{post_id}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_follow_flow() {
    let Some(app) = test_app().await else { return };

    let (username_a, email_a, password_a) = register_user(&app).await;
    let (_, email_b, password_b) = register_user(&app).await;
    let token_b = login(&app, &email_b, &password_b).await;

    // B follows A
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/follow/{username_a}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // following again conflicts
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            &format!("/follow/{username_a}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // status reflects the edge
    let response = app
        .clone()
        .oneshot(authed_request(
            "GET",
            &format!("/follow/status?username={username_a}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["following"], true);

    // A sees B among followers
    let token_a = login(&app, &email_a, &password_a).await;
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/follow/followers", &token_a, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(!body.as_array().unwrap().is_empty());

    // unfollow succeeds once, then is "not found"
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/follow/{username_a}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_request(
            "DELETE",
            &format!("/follow/{username_a}"),
            &token_b,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_self_follow_is_forbidden() {
    let Some(app) = test_app().await else { return };

    let (username, email, password) = register_user(&app).await;
    let token = login(&app, &email, &password).await;

    let response = app
        .oneshot(authed_request(
            "POST",
            &format!("/follow/{username}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let Some(app) = test_app().await else { return };

    let response = app
        .oneshot(json_request(
            "POST",
            "/post/create",
            json!({ "title": "t", "content": "c" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
