/// Common test utilities for authentication service integration tests
///
/// Provides a database-backed test context. Tests that use it are marked
/// `#[ignore]` and expect `DATABASE_URL` to point at a disposable database.

use sqlx::PgPool;
use taskmesh_auth::models::account::{Account, CreateAccount};
use taskmesh_shared::auth::password::hash_password;
use taskmesh_shared::models::role::Role;
use uuid::Uuid;

/// Test context holding the pool and a helper for unique fixtures
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

    /// Creates an account with a unique username
    pub async fn create_account(&self, role: Role) -> anyhow::Result<Account> {
        let suffix = Uuid::new_v4().simple().to_string();
        let account = Account::create(
            &self.db,
            CreateAccount {
                username: format!("user-{}", &suffix[..12]),
                password_hash: hash_password("integration-test-password")?,
                first_name: Some("Test".to_string()),
                last_name: None,
                email: Some(format!("user-{}@example.com", &suffix[..12])),
                role,
            },
        )
        .await?;

        Ok(account)
    }

    /// Removes an account and its cascade-deleted token row
    pub async fn cleanup_account(&self, id: i64) -> anyhow::Result<()> {
        Account::delete(&self.db, id).await?;
        Ok(())
    }
}
