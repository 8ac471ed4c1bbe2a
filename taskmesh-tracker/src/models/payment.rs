/// Payment model
///
/// A payment is a recorded association between a task and a mirrored
/// account with an exact amount. The core task-tracking logic does not
/// drive payments; they are written by whatever settles a task and read
/// back for reporting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A recorded payment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Payment {
    /// Local surrogate key
    pub id: i64,

    /// The task the payment settles
    pub task_public_id: Uuid,

    /// The paying/paid account's public identity
    pub user_public_id: Uuid,

    /// Exact amount, no floating-point rounding
    pub amount: Decimal,

    /// When the payment was recorded
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Records a payment against a task
    pub async fn record(
        pool: &PgPool,
        task_public_id: Uuid,
        user_public_id: Uuid,
        amount: Decimal,
    ) -> Result<Self, sqlx::Error> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (task_public_id, user_public_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, task_public_id, user_public_id, amount, created_at
            "#,
        )
        .bind(task_public_id)
        .bind(user_public_id)
        .bind(amount)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    /// Lists payments recorded against a task
    pub async fn list_for_task(
        pool: &PgPool,
        task_public_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, task_public_id, user_public_id, amount, created_at
            FROM payments
            WHERE task_public_id = $1
            ORDER BY id
            "#,
        )
        .bind(task_public_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }
}

// Database-backed coverage lives in tests/assignment.rs alongside the task
// fixtures it shares.
