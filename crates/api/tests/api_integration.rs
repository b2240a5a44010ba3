//! API integration tests.
//!
//! Router-level checks against a mock database: authentication, permission
//! layers and response shapes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::redundant_clone)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use yatube_api::{AppState, app};
use yatube_common::{
    LocalStorage,
    config::{
        AuthConfig, Config, DatabaseConfig, LoggingConfig, MediaConfig, PaginationConfig,
        ServerConfig,
    },
};
use yatube_db::entities::{group, post, user};

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            url: "http://testserver".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            secret_key: "test-secret".to_string(),
            access_token_lifetime_secs: 300,
            refresh_token_lifetime_secs: 86_400,
        },
        pagination: PaginationConfig::default(),
        media: MediaConfig::default(),
        logging: LoggingConfig::default(),
        admin: None,
    }
}

/// Create the test router over the given mock database.
fn create_test_router(db: DatabaseConnection) -> Router {
    let config = create_test_config();
    let storage = Arc::new(LocalStorage::from_config(&config.media, &config.server.url));
    let state = AppState::new(Arc::new(db), &config, storage);
    app(state)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn create_test_user(id: i64, username: &str) -> user::Model {
    user::Model {
        id,
        username: username.to_string(),
        password: "hash".to_string(),
        is_staff: false,
        date_joined: Utc::now().into(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_anonymous_post_create_returns_401() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/posts/")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"text":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_invalid_bearer_token_rejected_on_safe_method() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/groups/")
                .method("GET")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "TOKEN_NOT_VALID");
}

#[tokio::test]
async fn test_follow_list_requires_authentication() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/follow/")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_groups_list() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[group::Model {
            id: 1,
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: "All about cats".to_string(),
        }]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/groups/")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        serde_json::json!([{
            "id": 1,
            "title": "Cats",
            "slug": "cats",
            "description": "All about cats",
        }])
    );
}

#[tokio::test]
async fn test_groups_are_read_only() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/groups/")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"Cats","slug":"cats"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_post_list_without_limit_is_plain_array() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[post::Model {
            id: 1,
            text: "hello".to_string(),
            pub_date: Utc::now().into(),
            author_id: 1,
            image: None,
            group_id: None,
        }]])
        .append_query_results([[create_test_user(1, "leo")]])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/posts/")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "leo");
    assert_eq!(posts[0]["group"], Value::Null);
    assert_eq!(posts[0]["image"], Value::Null);
}

#[tokio::test]
async fn test_jwt_create_with_unknown_user_returns_401() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<user::Model>::new()])
        .into_connection();
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jwt/create/")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"username":"ghost","password":"whatever"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_jwt_verify_with_garbage_returns_401() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jwt/verify/")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"token":"garbage"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_returns_400() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/jwt/create/")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/nonexistent/")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
