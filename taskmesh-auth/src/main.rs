//! # Taskmesh Authentication Service
//!
//! Public identity API: login, account create/update/delete, and the
//! synchronous token-check endpoint consumed by the task-tracking service.
//! Every account mutation publishes a lifecycle event to the `account`
//! Redis stream after its local commit.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskmesh-auth
//! ```

use taskmesh_auth::{
    app::{build_router, AppState},
    config::Config,
};
use taskmesh_shared::db::pool::{create_pool, DatabaseConfig};
use taskmesh_shared::redis::{AccountEventWriter, RedisClient, RedisConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmesh_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskmesh authentication service v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let redis = RedisClient::new(RedisConfig::from_env()?).await?;
    let events = AccountEventWriter::new(redis);

    let bind_address = config.bind_address();
    let state = AppState::new(pool, events, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting...");
        })
        .await?;

    Ok(())
}
