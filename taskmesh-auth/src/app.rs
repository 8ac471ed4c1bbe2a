/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware. The state is constructed once at
/// startup and injected everywhere — no ambient globals.
///
/// # Example
///
/// ```no_run
/// use taskmesh_auth::{app::AppState, config::Config};
/// use taskmesh_shared::redis::{AccountEventWriter, RedisClient, RedisConfig};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let redis = RedisClient::new(RedisConfig::from_env()?).await?;
/// let state = AppState::new(pool, AccountEventWriter::new(redis), config);
/// let app = taskmesh_auth::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskmesh_shared::redis::stream_writer::AccountEventWriter;
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

    /// Account event publisher
    pub events: AccountEventWriter,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, events: AccountEventWriter, config: Config) -> Self {
        Self {
            db,
            events,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.token.secret
    }
}

/// Builds the complete Axum router
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health              # Health check (public)
/// └── /auth/
///     ├── POST /login      # Form credentials -> bearer token
///     ├── POST /create     # Register account, publishes create event
///     ├── POST /update     # Mutate account, token-gated, publishes update event
///     ├── POST /delete     # Remove account, token-gated, publishes delete event
///     └── GET  /check      # Cross-service token verification
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/login", post(routes::sessions::login))
        .route("/create", post(routes::accounts::create))
        .route("/update", post(routes::accounts::update))
        .route("/delete", post(routes::accounts::delete))
        .route("/check", get(routes::sessions::check));

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
