/// Account model and database operations
///
/// The `accounts` table is the authoritative identity store for the whole
/// system. The internal integer `id` never crosses the service boundary;
/// external callers and the event channel only ever see `public_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE accounts (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     username TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     first_name TEXT,
///     last_name TEXT,
///     email TEXT,
///     role INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskmesh_auth::models::account::{Account, CreateAccount};
/// use taskmesh_shared::models::role::Role;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let account = Account::create(
///     &pool,
///     CreateAccount {
///         username: "alice".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///         first_name: Some("Alice".to_string()),
///         last_name: None,
///         email: Some("alice@example.com".to_string()),
///         role: Role::Client,
///     },
/// )
/// .await?;
/// println!("Created account: {}", account.public_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskmesh_shared::events::AccountPayload;
use taskmesh_shared::models::role::Role;
use uuid::Uuid;

/// Account model representing an authoritative identity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// Internal primary key, never exposed across the boundary
    pub id: i64,

    /// Stable external identity (UUID v4)
    pub public_id: Uuid,

    /// Unique login name
    pub username: String,

    /// Argon2id password hash, never plaintext
    pub password_hash: String,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,

    /// Optional contact email
    pub email: Option<String>,

    /// Role in the privilege hierarchy
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new account
#[derive(Debug, Clone)]
pub struct CreateAccount {
    /// Unique login name
    pub username: String,

    /// Argon2id hash of the password (NOT the plaintext)
    pub password_hash: String,

    /// Optional given name
    pub first_name: Option<String>,

    /// Optional family name
    pub last_name: Option<String>,

    /// Optional contact email
    pub email: Option<String>,

    /// Role in the privilege hierarchy
    pub role: Role,
}

/// Input for updating an existing account
///
/// Only non-None fields are written; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccount {
    /// New login name
    pub username: Option<String>,

    /// New given name
    pub first_name: Option<String>,

    /// New family name
    pub last_name: Option<String>,

    /// New contact email
    pub email: Option<String>,

    /// New role
    pub role: Option<Role>,
}

impl Account {
    /// Creates a new account
    ///
    /// Generates a fresh UUID v4 as the public identity.
    ///
    /// # Errors
    ///
    /// Returns an error on a duplicate username (unique constraint) or any
    /// other database failure.
    pub async fn create(pool: &PgPool, data: CreateAccount) -> Result<Self, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (public_id, username, password_hash, first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, public_id, username, password_hash, first_name, last_name, email, role,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by username
    ///
    /// # Returns
    ///
    /// The account if found, None otherwise
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, public_id, username, password_hash, first_name, last_name, email, role,
                   created_at, updated_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Finds an account by internal id
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, public_id, username, password_hash, first_name, last_name, email, role,
                   created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Updates an existing account
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed.
    ///
    /// # Returns
    ///
    /// The updated account if found, None if no such id exists
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateAccount,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the UPDATE dynamically from the fields actually present
        let mut query = String::from("UPDATE accounts SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, public_id, username, password_hash, first_name, \
             last_name, email, role, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Account>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        let account = q.fetch_optional(pool).await?;

        Ok(account)
    }

    /// Deletes an account by internal id
    ///
    /// # Returns
    ///
    /// The deleted account's public identity if it existed, None otherwise.
    /// The public id is what the delete event carries.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Uuid>, sqlx::Error> {
        let public_id: Option<(Uuid,)> =
            sqlx::query_as("DELETE FROM accounts WHERE id = $1 RETURNING public_id")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(public_id.map(|(id,)| id))
    }

    /// Full field set for a create event payload
    pub fn snapshot(&self) -> AccountPayload {
        AccountPayload {
            username: Some(self.username.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: Some(self.role),
            user_public_id: self.public_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_account_default_is_empty() {
        let update = UpdateAccount::default();
        assert!(update.username.is_none());
        assert!(update.first_name.is_none());
        assert!(update.last_name.is_none());
        assert!(update.email.is_none());
        assert!(update.role.is_none());
    }

    // Database-backed CRUD coverage lives in tests/token_store.rs alongside
    // the token invariants, since both need a live PostgreSQL.
}
