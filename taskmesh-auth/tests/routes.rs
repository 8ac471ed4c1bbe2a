/// Router-level tests for the authentication service
///
/// These exercise the HTTP surface with a lazy (never-connecting) database
/// pool: request validation happens before any storage work, and storage
/// failures surface as 500 rather than masquerading as 401.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use sqlx::postgres::PgPool;
use taskmesh_auth::app::{build_router, AppState};
use taskmesh_auth::config::{Config, DatabaseConfig, ServerConfig, TokenConfig};
use taskmesh_shared::redis::stream_writer::AccountEventWriter;
use tower::ServiceExt;

/// A router whose database never connects
///
/// The event writer needs a Redis connection to construct, so these tests
/// only cover the paths that reject before reaching either backend — plus
/// health, which degrades gracefully.
async fn test_router() -> Option<axum::Router> {
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgresql://nobody@127.0.0.1:1/unreachable".to_string(),
            max_connections: 1,
        },
        token: TokenConfig {
            secret: "router-test-secret-at-least-32-bytes-long".to_string(),
            ttl_minutes: 15,
        },
    };

    let db = PgPool::connect_lazy(&config.database.url).unwrap();

    // Local Redis if available; otherwise skip (the writer is never
    // reached by these requests, but it must exist to build the state)
    let redis = taskmesh_shared::redis::RedisClient::new(
        taskmesh_shared::redis::RedisConfig::default_for_test(),
    )
    .await
    .ok()?;

    Some(build_router(AppState::new(
        db,
        AccountEventWriter::new(redis),
        config,
    )))
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Health stays 200 and reports the database as down rather than erroring.
#[tokio::test]
#[ignore] // Requires running Redis instance
async fn test_health_degraded_without_database() {
    let Some(app) = test_router().await else {
        panic!("Redis must be running for router tests");
    };

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
}

/// Validation rejects a malformed registration before touching storage.
#[tokio::test]
#[ignore] // Requires running Redis instance
async fn test_create_rejects_invalid_payload() {
    let Some(app) = test_router().await else {
        panic!("Redis must be running for router tests");
    };

    let response = app
        .oneshot(post_json(
            "/auth/create",
            json!({
                "username": "al",
                "email": "not-an-email",
                "password": "short"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");

    // Each failed field is reported
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"username"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

/// An out-of-range numeric role is a 400 before any storage work.
#[tokio::test]
#[ignore] // Requires running Redis instance
async fn test_create_rejects_unknown_role() {
    let Some(app) = test_router().await else {
        panic!("Redis must be running for router tests");
    };

    let response = app
        .oneshot(post_json(
            "/auth/create",
            json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "a-long-enough-password",
                "role": 9
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Storage failure on login is a 500, never a 401 — infrastructure failure
/// must stay distinguishable from bad credentials.
#[tokio::test]
#[ignore] // Requires running Redis instance
async fn test_login_surfaces_storage_failure() {
    let Some(app) = test_router().await else {
        panic!("Redis must be running for router tests");
    };

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("username=alice&password=whatever"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
