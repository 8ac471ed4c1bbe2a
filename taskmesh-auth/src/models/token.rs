/// Bearer token store
///
/// A token is live only while its exact `(user_id, token)` pair exists in
/// the `tokens` table. The primary key on `user_id` means issuing a token
/// upserts over the previous row, so a second login invalidates the first
/// session at the storage layer even though the superseded JWT still
/// verifies cryptographically.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tokens (
///     user_id BIGINT PRIMARY KEY REFERENCES accounts(id) ON DELETE CASCADE,
///     token TEXT NOT NULL,
///     token_type TEXT NOT NULL,
///     issued_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The only token type the service issues
pub const TOKEN_TYPE: &str = "bearer";

/// A stored bearer token row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenRecord {
    /// Owning account's internal id
    pub user_id: i64,

    /// The bearer token string (a signed JWT)
    pub token: String,

    /// Always "bearer"
    pub token_type: String,

    /// When this token was issued
    pub issued_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Persists a freshly signed token as the user's single current token
    ///
    /// Upserts on `user_id`: any previously stored token for the same user
    /// is overwritten and stops verifying.
    pub async fn issue(pool: &PgPool, user_id: i64, token: &str) -> Result<Self, sqlx::Error> {
        let record = sqlx::query_as::<_, TokenRecord>(
            r#"
            INSERT INTO tokens (user_id, token, token_type, issued_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, issued_at = EXCLUDED.issued_at
            RETURNING user_id, token, token_type, issued_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(TOKEN_TYPE)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// True iff exactly this `(user_id, token)` pair is stored
    ///
    /// This is the authority for "is this token still considered issued";
    /// cryptographic validity alone is not sufficient.
    pub async fn verify_local(
        pool: &PgPool,
        user_id: i64,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT user_id FROM tokens WHERE user_id = $1 AND token = $2")
                .bind(user_id)
                .bind(token)
                .fetch_optional(pool)
                .await?;

        Ok(row.is_some())
    }

    /// Same question keyed by the externally visible UUID identity
    ///
    /// Joins accounts to tokens on the internal id; this is the shape
    /// exposed across the service boundary, since external callers only
    /// know the UUID.
    pub async fn verify_by_identity(
        pool: &PgPool,
        public_id: Uuid,
        token: &str,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT tokens.user_id
            FROM tokens
            JOIN accounts ON accounts.id = tokens.user_id
            WHERE accounts.public_id = $1 AND tokens.token = $2
            "#,
        )
        .bind(public_id)
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_type_constant() {
        assert_eq!(TOKEN_TYPE, "bearer");
    }

    // The single-current-token invariant (issuing T2 kills T1) needs a live
    // PostgreSQL and is covered in tests/token_store.rs.
}
