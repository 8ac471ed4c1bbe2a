/// Account mirror model
///
/// A read-optimized local copy of the accounts owned by the authentication
/// service, kept in sync by the event consumer. By convention nothing else
/// writes to this table. The mirror may be transiently stale, or permanently
/// diverged if an event was lost — there is no reconciliation or backfill.
///
/// Update events apply as a **partial merge**: only fields present and
/// non-null in the payload overwrite; everything else keeps its mirrored
/// value.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE account_mirror (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     username TEXT NOT NULL,
///     first_name TEXT,
///     last_name TEXT,
///     email TEXT,
///     role INTEGER NOT NULL,
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use taskmesh_shared::events::AccountPayload;
use taskmesh_shared::models::role::Role;
use thiserror::Error;
use uuid::Uuid;

/// Errors applying an event payload to the mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    /// A create payload lacked a field the mirror schema requires
    #[error("event payload missing required field: {0}")]
    MissingField(&'static str),

    /// Storage failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A mirrored account row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MirroredAccount {
    /// Local surrogate key
    pub id: i64,

    /// The join key against the authoritative account
    pub public_id: Uuid,

    /// Mirrored login name
    pub username: String,

    /// Mirrored given name
    pub first_name: Option<String>,

    /// Mirrored family name
    pub last_name: Option<String>,

    /// Mirrored contact email
    pub email: Option<String>,

    /// Mirrored role
    pub role: Role,

    /// When the mirror row last changed
    pub updated_at: DateTime<Utc>,
}

impl MirroredAccount {
    /// Inserts a mirror row from a create event payload
    ///
    /// # Errors
    ///
    /// Returns `MissingField` when the payload lacks a username or role
    /// (create events always carry both; their absence means a malformed
    /// event) and `Database` on storage failure, including a replayed
    /// create hitting the unique constraint.
    pub async fn insert(pool: &PgPool, payload: &AccountPayload) -> Result<Self, MirrorError> {
        let username = payload
            .username
            .as_deref()
            .ok_or(MirrorError::MissingField("username"))?;
        let role = payload.role.ok_or(MirrorError::MissingField("role"))?;

        let row = sqlx::query_as::<_, MirroredAccount>(
            r#"
            INSERT INTO account_mirror (public_id, username, first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, public_id, username, first_name, last_name, email, role, updated_at
            "#,
        )
        .bind(payload.user_public_id)
        .bind(username)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Merges an update event payload into the mirror row
    ///
    /// Only non-null payload fields overwrite; null fields preserve the
    /// current mirrored value (COALESCE).
    ///
    /// # Returns
    ///
    /// The merged row, or None if no row exists for the payload's identity
    /// (e.g. the create event was lost — logged by the caller, not
    /// recovered).
    pub async fn merge_update(
        pool: &PgPool,
        payload: &AccountPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, MirroredAccount>(
            r#"
            UPDATE account_mirror SET
                username = COALESCE($2, username),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                role = COALESCE($6, role),
                updated_at = NOW()
            WHERE public_id = $1
            RETURNING id, public_id, username, first_name, last_name, email, role, updated_at
            "#,
        )
        .bind(payload.user_public_id)
        .bind(&payload.username)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&payload.email)
        .bind(payload.role)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Removes the mirror row for a deleted account
    ///
    /// # Returns
    ///
    /// True if a row was removed
    pub async fn remove(pool: &PgPool, public_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM account_mirror WHERE public_id = $1")
            .bind(public_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a mirror row by public identity
    pub async fn find_by_public_id(
        pool: &PgPool,
        public_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, MirroredAccount>(
            r#"
            SELECT id, public_id, username, first_name, last_name, email, role, updated_at
            FROM account_mirror
            WHERE public_id = $1
            "#,
        )
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }

    /// Local role-authorization check
    ///
    /// True iff a mirror row exists for `public_id` with a privileged role
    /// (admin or manager). Pure local read, no network call; one half of
    /// the two-factor authorization on privileged task operations.
    pub async fn is_privileged(pool: &PgPool, public_id: Uuid) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM account_mirror WHERE public_id = $1 AND role <= $2",
        )
        .bind(public_id)
        .bind(Role::Manager)
        .fetch_optional(pool)
        .await?;

        Ok(row.is_some())
    }

    /// The eligible assignee pool: every mirrored account with a privileged
    /// role, in no particular order
    pub async fn eligible_pool(pool: &PgPool) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT public_id FROM account_mirror WHERE role <= $1")
                .bind(Role::Manager)
                .fetch_all(pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
