/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router. The state is constructed once at startup and injected everywhere
/// — no ambient globals; the mirror consumer is spawned separately in main
/// and shares only the pool.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use taskmesh_tracker::{app::AppState, config::Config, integrations::AuthClient};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let auth = AuthClient::new(&config.auth.base_url, Duration::from_secs(3))?;
/// let state = AppState::new(pool, auth, config);
/// let app = taskmesh_tracker::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{assignment::AssignmentEngine, config::Config, integrations::AuthClient};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; internals
/// are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Task assignment engine
    pub engine: AssignmentEngine,

    /// Remote token check client
    pub auth: AuthClient,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, auth: AuthClient, config: Config) -> Self {
        Self {
            engine: AssignmentEngine::new(db.clone()),
            db,
            auth,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /task_tracker/task/
///     ├── POST /create     # Token-gated task creation
///     ├── POST /check      # Token + local role check
///     ├── POST /reassign   # Token + local role gated redistribution
///     └── POST /dashboard  # Reporting view, public
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let task_routes = Router::new()
        .route("/create", post(routes::tasks::create))
        .route("/check", post(routes::tasks::check))
        .route("/reassign", post(routes::tasks::reassign))
        .route("/dashboard", post(routes::tasks::dashboard));

    Router::new()
        .merge(health_routes)
        .nest("/task_tracker/task", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
