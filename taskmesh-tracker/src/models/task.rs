/// Task model and database operations
///
/// # State Machine
///
/// ```text
/// to_do → in_progress → done
/// to_do → failed
/// in_progress → failed
/// ```
///
/// `done` and `failed` are terminal: nothing transitions out of them, and
/// reassignment only re-enters `to_do` from the two live states.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     public_id UUID NOT NULL UNIQUE,
///     assignee_public_id UUID NOT NULL REFERENCES account_mirror(public_id) ON DELETE CASCADE,
///     cost NUMERIC NOT NULL,
///     status INTEGER NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task execution status
///
/// Numeric values are the wire and storage format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum TaskStatus {
    /// Assigned, not yet started
    ToDo = 1,

    /// Being worked on
    InProgress = 2,

    /// Finished successfully (terminal)
    Done = 3,

    /// Abandoned (terminal)
    Failed = 4,
}

impl TaskStatus {
    /// Numeric wire/storage representation
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Human-readable name for logging
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::ToDo => "to_do",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    /// Terminal states never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    /// Checks if a transition to `target` is valid
    pub fn can_transition_to(self, target: TaskStatus) -> bool {
        match (self, target) {
            (TaskStatus::ToDo, TaskStatus::InProgress) => true,
            (TaskStatus::ToDo, TaskStatus::Failed) => true,
            (TaskStatus::InProgress, TaskStatus::Done) => true,
            (TaskStatus::InProgress, TaskStatus::Failed) => true,
            // Reassignment re-enters to_do from live states only
            (TaskStatus::ToDo, TaskStatus::ToDo) => true,
            (TaskStatus::InProgress, TaskStatus::ToDo) => true,
            _ => false,
        }
    }
}

impl From<TaskStatus> for i32 {
    fn from(status: TaskStatus) -> i32 {
        status.as_i32()
    }
}

impl TryFrom<i32> for TaskStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TaskStatus::ToDo),
            2 => Ok(TaskStatus::InProgress),
            3 => Ok(TaskStatus::Done),
            4 => Ok(TaskStatus::Failed),
            other => Err(format!("unknown task status value: {}", other)),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Local surrogate key
    pub id: i64,

    /// Stable external identity
    pub public_id: Uuid,

    /// The assignee's mirrored public identity
    pub assignee_public_id: Uuid,

    /// Exact cost, no floating-point rounding
    pub cost: Decimal,

    /// Current status
    pub status: TaskStatus,

    /// What needs doing
    pub description: String,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Flattened dashboard row: task fields joined with the assignee's mirror
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DashboardRow {
    /// Task identity
    pub task_public_id: Uuid,

    /// Assignee login name
    pub username: String,

    /// Task cost
    pub cost: Decimal,

    /// Task description
    pub description: String,

    /// Task status
    pub status: TaskStatus,

    /// Assignee email
    pub email: Option<String>,
}

impl Task {
    /// Inserts a new task in `to_do` with a fresh public identity
    pub async fn insert(
        pool: &PgPool,
        assignee_public_id: Uuid,
        cost: Decimal,
        description: &str,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (public_id, assignee_public_id, cost, status, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, public_id, assignee_public_id, cost, status, description,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(assignee_public_id)
        .bind(cost)
        .bind(TaskStatus::ToDo)
        .bind(description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists every task still eligible for reassignment
    ///
    /// Terminal tasks (done, failed) are excluded.
    pub async fn list_open(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, public_id, assignee_public_id, cost, status, description,
                   created_at, updated_at
            FROM tasks
            WHERE status NOT IN ($1, $2)
            ORDER BY id
            "#,
        )
        .bind(TaskStatus::Done)
        .bind(TaskStatus::Failed)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Hands a task to a new assignee and resets it to `to_do`
    ///
    /// # Returns
    ///
    /// True if the task row was updated
    pub async fn reassign(
        pool: &PgPool,
        id: i64,
        new_assignee: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET assignee_public_id = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(new_assignee)
        .bind(TaskStatus::ToDo)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a task along its state machine
    ///
    /// # Returns
    ///
    /// The updated task, or None if the task doesn't exist or the
    /// transition is not allowed from its current status.
    pub async fn transition(
        pool: &PgPool,
        public_id: Uuid,
        target: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let current = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, public_id, assignee_public_id, cost, status, description,
                   created_at, updated_at
            FROM tasks
            WHERE public_id = $1
            "#,
        )
        .bind(public_id)
        .fetch_optional(pool)
        .await?;

        let Some(task) = current else {
            return Ok(None);
        };

        if !task.status.can_transition_to(target) {
            tracing::warn!(
                task = %public_id,
                from = task.status.as_str(),
                to = target.as_str(),
                "Rejected invalid status transition"
            );
            return Ok(None);
        }

        let updated = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $2, updated_at = NOW()
            WHERE public_id = $1
            RETURNING id, public_id, assignee_public_id, cost, status, description,
                      created_at, updated_at
            "#,
        )
        .bind(public_id)
        .bind(target)
        .fetch_optional(pool)
        .await?;

        Ok(updated)
    }

    /// The dashboard read view: every task joined with its assignee's
    /// mirror row, regardless of status
    pub async fn dashboard(pool: &PgPool) -> Result<Vec<DashboardRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DashboardRow>(
            r#"
            SELECT tasks.public_id AS task_public_id,
                   account_mirror.username,
                   tasks.cost,
                   tasks.description,
                   tasks.status,
                   account_mirror.email
            FROM tasks
            JOIN account_mirror ON account_mirror.public_id = tasks.assignee_public_id
            ORDER BY tasks.id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::ToDo.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn test_transition_table() {
        use TaskStatus::*;

        assert!(ToDo.can_transition_to(InProgress));
        assert!(ToDo.can_transition_to(Failed));
        assert!(InProgress.can_transition_to(Done));
        assert!(InProgress.can_transition_to(Failed));

        // Reassignment path
        assert!(ToDo.can_transition_to(ToDo));
        assert!(InProgress.can_transition_to(ToDo));

        // Terminal states stay terminal, including under reassignment
        assert!(!Done.can_transition_to(ToDo));
        assert!(!Done.can_transition_to(InProgress));
        assert!(!Failed.can_transition_to(ToDo));
        assert!(!Failed.can_transition_to(InProgress));

        // No skipping straight to done
        assert!(!ToDo.can_transition_to(Done));
    }

    #[test]
    fn test_status_numeric_roundtrip() {
        for status in [
            TaskStatus::ToDo,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Failed,
        ] {
            assert_eq!(TaskStatus::try_from(status.as_i32()), Ok(status));
        }
        assert!(TaskStatus::try_from(0).is_err());
        assert!(TaskStatus::try_from(5).is_err());
    }

    #[test]
    fn test_status_serializes_as_number() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "2");
    }
}
