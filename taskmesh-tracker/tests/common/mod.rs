/// Common test utilities for task-tracking integration tests
///
/// Provides a database-backed test context and mirror fixtures built by
/// applying real account events, the same path the consumer takes. Tests
/// that use it are marked `#[ignore]` and expect `DATABASE_URL` to point at
/// a disposable database.

use sqlx::PgPool;
use taskmesh_shared::events::{AccountEvent, AccountPayload};
use taskmesh_shared::models::role::Role;
use taskmesh_tracker::consumer::apply_event;
use uuid::Uuid;

/// Test context holding the pool
pub struct TestContext {
    pub db: PgPool,
}

impl TestContext {
    /// Connects and applies migrations
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL")?;
        let db = PgPool::connect(&url).await?;

        sqlx::migrate!("./migrations").run(&db).await?;

        Ok(Self { db })
    }

    /// Builds a full create payload with a unique username
    pub fn payload(role: Role) -> AccountPayload {
        let public_id = Uuid::new_v4();
        let suffix = public_id.simple().to_string();
        AccountPayload {
            username: Some(format!("user-{}", &suffix[..12])),
            first_name: Some("Test".to_string()),
            last_name: Some("Account".to_string()),
            email: Some(format!("user-{}@example.com", &suffix[..12])),
            role: Some(role),
            user_public_id: public_id,
        }
    }

    /// Mirrors an account by applying a create event
    pub async fn mirror_account(&self, role: Role) -> anyhow::Result<AccountPayload> {
        let payload = Self::payload(role);
        apply_event(&self.db, &AccountEvent::Created(payload.clone())).await?;
        Ok(payload)
    }

    /// Drops a mirrored account (and, via cascade, its tasks)
    pub async fn drop_account(&self, public_id: Uuid) -> anyhow::Result<()> {
        apply_event(&self.db, &AccountEvent::Deleted { user_id: public_id }).await?;
        Ok(())
    }
}
