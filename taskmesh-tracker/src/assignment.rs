/// Task assignment engine
///
/// Creates tasks and arbitrates reassignment across the eligible pool — the
/// mirrored accounts privileged enough (admin or manager) to own tasks.
/// Assignees are always drawn uniformly at random from the pool.
///
/// Reassignment snapshots the pool once and then commits each task
/// independently: one failed task never blocks the rest, and the set of
/// successfully reassigned tasks may be a strict subset of the open tasks.
/// Nothing serializes the snapshot against concurrent mirror changes; a
/// pool change mid-pass is an accepted race.
///
/// # Example
///
/// ```no_run
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
/// use taskmesh_tracker::assignment::AssignmentEngine;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let engine = AssignmentEngine::new(pool);
///
/// let task = engine
///     .create_task(Decimal::new(1000, 2), "ship the release")
///     .await?;
/// println!("Assigned to {}", task.assignee_public_id);
/// # Ok(())
/// # }
/// ```

use crate::models::mirror::MirroredAccount;
use crate::models::task::{DashboardRow, Task};
use rand::seq::SliceRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

/// Assignment engine errors
///
/// `EmptyPool` is a business outcome, not an infrastructure failure;
/// callers decide how to surface it.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// No mirrored account is eligible to take the task
    #[error("no eligible assignees in the account mirror")]
    EmptyPool,

    /// Storage failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of one reassignment pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReassignSummary {
    /// Tasks successfully handed to a new assignee
    pub reassigned: usize,

    /// Tasks whose individual commit failed (logged and left as they were)
    pub failed: usize,
}

/// Task assignment engine
#[derive(Clone)]
pub struct AssignmentEngine {
    db: PgPool,
}

impl AssignmentEngine {
    /// Creates a new engine over the service's pool
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Creates a task and assigns it to a uniformly random eligible account
    ///
    /// The new task starts in `to_do`.
    ///
    /// # Errors
    ///
    /// - `EmptyPool` if no mirrored account has a privileged role; the
    ///   caller logs it and gives up (no retry)
    /// - `Database` on insert failure
    pub async fn create_task(
        &self,
        cost: Decimal,
        description: &str,
    ) -> Result<Task, AssignmentError> {
        let pool = MirroredAccount::eligible_pool(&self.db).await?;

        let assignee = *pool
            .choose(&mut rand::thread_rng())
            .ok_or(AssignmentError::EmptyPool)?;

        let task = Task::insert(&self.db, assignee, cost, description).await?;

        tracing::info!(
            task = %task.public_id,
            assignee = %assignee,
            cost = %cost,
            "Task created and assigned"
        );

        Ok(task)
    }

    /// Redistributes every open task across the current eligible pool
    ///
    /// The pool is computed once for the whole pass. Each open task (status
    /// not done and not failed) independently draws a new uniformly random
    /// assignee and resets to `to_do`; each commits on its own, so per-task
    /// failures are counted and skipped rather than aborting the pass.
    ///
    /// An empty pool reassigns nothing and leaves every task untouched.
    pub async fn reassign_open_tasks(&self) -> Result<ReassignSummary, sqlx::Error> {
        let pool = MirroredAccount::eligible_pool(&self.db).await?;
        let mut summary = ReassignSummary::default();

        if pool.is_empty() {
            tracing::warn!("Reassignment requested with an empty eligible pool, nothing to do");
            return Ok(summary);
        }

        for task in Task::list_open(&self.db).await? {
            // Uniform draw per task; a task may land on its current assignee
            let Some(&assignee) = pool.choose(&mut rand::thread_rng()) else {
                break; // unreachable: pool checked non-empty above
            };

            match Task::reassign(&self.db, task.id, assignee).await {
                Ok(true) => summary.reassigned += 1,
                Ok(false) => {
                    // Deleted out from under the pass; nothing to do
                    tracing::warn!(task = %task.public_id, "Task vanished during reassignment");
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(
                        task = %task.public_id,
                        error = %e,
                        "Failed to reassign task, continuing with the rest"
                    );
                }
            }
        }

        tracing::info!(
            reassigned = summary.reassigned,
            failed = summary.failed,
            "Reassignment pass finished"
        );

        Ok(summary)
    }

    /// The dashboard read view, a pure reporting query
    pub async fn dashboard(&self) -> Result<Vec<DashboardRow>, sqlx::Error> {
        Task::dashboard(&self.db).await
    }
}

// Pool invariants and empty-pool idempotence are covered in
// tests/assignment.rs against a live PostgreSQL.
