/// Account mirror consumer
///
/// A single long-running loop per process that reads every entry from the
/// `account` stream in arrival order and applies it to the local mirror.
/// Processing is strictly sequential — one entry at a time — so mirror
/// writes never race each other; throughput is bounded by one-at-a-time
/// commit latency and that is deliberate.
///
/// One bad entry never stops the loop: malformed events and storage
/// failures are logged, counted, and skipped, and the loop advances past
/// them. Delivery is at-least-once with no deduplication, so a replayed
/// create failing the unique constraint is an expected, counted skip.
///
/// # Example
///
/// ```no_run
/// use sqlx::PgPool;
/// use taskmesh_shared::redis::{AccountEventReader, RedisClient, RedisConfig};
/// use taskmesh_tracker::consumer::MirrorConsumer;
///
/// # async fn example(db: PgPool) -> anyhow::Result<()> {
/// let redis = RedisClient::new(RedisConfig::from_env()?).await?;
/// let consumer = MirrorConsumer::new(db, AccountEventReader::new(redis), "0".to_string());
///
/// tokio::spawn(consumer.run());
/// # Ok(())
/// # }
/// ```

use crate::models::mirror::{MirrorError, MirroredAccount};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use taskmesh_shared::events::{deserialize_event, AccountEvent, EventError};
use taskmesh_shared::redis::stream_reader::AccountEventReader;
use thiserror::Error;

/// How long one XREAD blocks waiting for new entries
const BLOCK_MS: usize = 5000;

/// Maximum entries fetched per read
const BATCH_COUNT: usize = 100;

/// Why a single entry failed to apply
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The entry could not be decoded into an account event
    #[error("malformed event: {0}")]
    Malformed(#[from] EventError),

    /// The decoded event could not be applied to the mirror
    #[error("mirror apply failed: {0}")]
    Mirror(#[from] MirrorError),

    /// Storage failure outside the mirror apply path
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Applies one decoded account event to the mirror
///
/// Exposed separately from the loop so the event-application semantics are
/// testable without Redis.
///
/// - `Created`: insert the mirror row
/// - `Updated`: partial merge by identity; a miss (create event lost) is
///   logged but is not an error — there is nothing to merge into
/// - `Deleted`: remove by identity; a miss is likewise just logged
pub async fn apply_event(pool: &PgPool, event: &AccountEvent) -> Result<(), ApplyError> {
    match event {
        AccountEvent::Created(payload) => {
            let row = MirroredAccount::insert(pool, payload).await?;
            tracing::info!(public_id = %row.public_id, "Mirror row created");
        }
        AccountEvent::Updated(payload) => {
            match MirroredAccount::merge_update(pool, payload).await? {
                Some(row) => {
                    tracing::info!(public_id = %row.public_id, "Mirror row updated");
                }
                None => {
                    // The account was never mirrored; with no backfill the
                    // divergence stands until a later create or delete.
                    tracing::warn!(
                        public_id = %payload.user_public_id,
                        "Update event for unknown mirror row, skipped"
                    );
                }
            }
        }
        AccountEvent::Deleted { user_id } => {
            let removed = MirroredAccount::remove(pool, *user_id).await?;
            if removed {
                tracing::info!(public_id = %user_id, "Mirror row removed");
            } else {
                tracing::warn!(
                    public_id = %user_id,
                    "Delete event for unknown mirror row, skipped"
                );
            }
        }
    }

    Ok(())
}

/// The long-running mirror consumer
pub struct MirrorConsumer {
    db: PgPool,
    reader: AccountEventReader,
    start_id: String,
    failures: Arc<AtomicU64>,
}

impl MirrorConsumer {
    /// Creates a consumer resuming after `start_id` ("0" replays the whole
    /// channel)
    pub fn new(db: PgPool, reader: AccountEventReader, start_id: String) -> Self {
        Self {
            db,
            reader,
            start_id,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handle to the failure counter, for health reporting and tests
    ///
    /// Counts entries that were skipped: malformed events, replayed
    /// creates, and storage failures alike.
    pub fn failure_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.failures)
    }

    /// Runs the consumer loop forever
    ///
    /// Read errors (Redis down) are logged and retried after a short pause;
    /// the position is only advanced past entries that were actually seen,
    /// so nothing is skipped over an outage.
    pub async fn run(self) {
        let mut last_id = self.start_id.clone();

        tracing::info!(start_id = %last_id, "Mirror consumer starting");

        loop {
            let batch = match self.reader.read_block(&last_id, BLOCK_MS, BATCH_COUNT).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read account stream, retrying");
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                    continue;
                }
            };

            for (stream_id, fields) in batch {
                if let Err(e) = self.apply_entry(&stream_id, &fields).await {
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        stream_id = %stream_id,
                        error = %e,
                        "Failed to apply account event, skipping"
                    );
                }

                // Advance past the entry regardless of outcome
                last_id = stream_id;
            }
        }
    }

    async fn apply_entry(
        &self,
        stream_id: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(), ApplyError> {
        let event = deserialize_event(fields)?;

        tracing::debug!(
            stream_id = %stream_id,
            op = event.op(),
            public_id = %event.public_id(),
            "Applying account event"
        );

        apply_event(&self.db, &event).await
    }
}

// Event-application semantics (convergence, merge behavior) are covered in
// tests/mirror.rs against a live PostgreSQL; the loop itself only sequences
// calls to `apply_event` and advances the stream position.
