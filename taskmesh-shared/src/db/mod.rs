/// Database utilities
///
/// This module provides PostgreSQL connection pooling shared by both
/// services. Each service owns its own database and its own `migrations/`
/// directory; migrations run at startup via `sqlx::migrate!` from within the
/// owning crate, so the runner lives there rather than here.
///
/// # Modules
///
/// - `pool`: Connection pool creation and health check

pub mod pool;

pub use pool::{create_pool, health_check, DatabaseConfig};
