//! # Taskmesh Task-Tracking Service
//!
//! Public task API plus the in-process account mirror consumer. The
//! consumer subscribes to the `account` Redis stream and applies each
//! lifecycle event to the local mirror, strictly one at a time; the HTTP
//! surface composes the mirror, the remote token check, and the assignment
//! engine.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskmesh-tracker
//! ```

use std::time::Duration;
use taskmesh_shared::db::pool::{create_pool, DatabaseConfig};
use taskmesh_shared::redis::{AccountEventReader, RedisClient, RedisConfig};
use taskmesh_tracker::{
    app::{build_router, AppState},
    config::Config,
    consumer::MirrorConsumer,
    integrations::AuthClient,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmesh_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskmesh task-tracking service v{} starting...",
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

    // One sequential mirror consumer per process
    let consumer = MirrorConsumer::new(
        pool.clone(),
        AccountEventReader::new(redis),
        config.consumer.start_id.clone(),
    );
    tokio::spawn(consumer.run());

    let auth = AuthClient::new(
        &config.auth.base_url,
        Duration::from_secs(config.auth.check_timeout_secs),
    )?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, auth, config);
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
