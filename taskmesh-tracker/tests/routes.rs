/// Router-level tests for the task-tracking service
///
/// These exercise the HTTP surface with a lazy (never-connecting) database
/// pool and a dead authentication endpoint, which is exactly what the
/// fail-closed and error-taxonomy rules are about: authorization failures
/// are 403, infrastructure failures are 500, and neither needs live
/// infrastructure to prove.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use sqlx::postgres::PgPool;
use std::time::Duration;
use taskmesh_tracker::app::{build_router, AppState};
use taskmesh_tracker::config::{
    AuthIntegrationConfig, Config, ConsumerConfig, DatabaseConfig, ServerConfig,
};
use taskmesh_tracker::integrations::AuthClient;
use tower::ServiceExt;
use uuid::Uuid;

/// A router whose database never connects and whose auth service is a dead
/// port
fn test_router() -> axum::Router {
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgresql://nobody@127.0.0.1:1/unreachable".to_string(),
            max_connections: 1,
        },
        auth: AuthIntegrationConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            check_timeout_secs: 1,
        },
        consumer: ConsumerConfig {
            start_id: "0".to_string(),
        },
    };

    let db = PgPool::connect_lazy(&config.database.url).unwrap();
    let auth = AuthClient::new(&config.auth.base_url, Duration::from_millis(250)).unwrap();

    build_router(AppState::new(db, auth, config))
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
async fn test_health_degraded_without_database() {
    let app = test_router();

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

/// Task creation is denied when the remote token check cannot answer.
#[tokio::test]
async fn test_create_fails_closed_when_auth_unreachable() {
    let app = test_router();

    let response = app
        .oneshot(post_json(
            "/task_tracker/task/create",
            json!({
                "token": "some-token",
                "public_user_id": Uuid::new_v4(),
                "cost": "10.00",
                "description": "x"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// The authorization probe is denied when the remote check cannot answer.
#[tokio::test]
async fn test_check_fails_closed_when_auth_unreachable() {
    let app = test_router();

    let response = app
        .oneshot(post_json(
            "/task_tracker/task/check",
            json!({
                "token": "some-token",
                "public_user_id": Uuid::new_v4()
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Reassignment carries the same two-factor gate as the probe.
#[tokio::test]
async fn test_reassign_fails_closed_when_auth_unreachable() {
    let app = test_router();

    let response = app
        .oneshot(post_json(
            "/task_tracker/task/reassign",
            json!({
                "token": "some-token",
                "public_user_id": Uuid::new_v4()
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Validation rejects before any authorization or storage work happens.
#[tokio::test]
async fn test_create_rejects_empty_description() {
    let app = test_router();

    let response = app
        .oneshot(post_json(
            "/task_tracker/task/create",
            json!({
                "token": "some-token",
                "public_user_id": Uuid::new_v4(),
                "cost": "10.00",
                "description": ""
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

/// Storage failure on the dashboard is a 500, not a silent empty list —
/// infrastructure failure stays distinguishable from a legitimate answer.
#[tokio::test]
async fn test_dashboard_surfaces_storage_failure() {
    let app = test_router();

    let response = app
        .oneshot(post_json("/task_tracker/task/dashboard", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "internal_error");
}
