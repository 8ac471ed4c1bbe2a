/// After-commit event publication
///
/// Every successful account mutation publishes one lifecycle event to the
/// `account` stream. The publish runs strictly after the local commit; a
/// publish failure is logged and the committed mutation stands. That makes
/// the channel at-least-once and possibly lossy — mirror divergence on
/// publish failure is a known, accepted gap (no outbox, no retry beyond the
/// writer's own bounded backoff).

use taskmesh_shared::events::AccountEvent;
use taskmesh_shared::redis::stream_writer::AccountEventWriter;

/// Publishes an event for an already-committed mutation
///
/// Never fails the caller: the database commit has already happened and must
/// not be rolled back over a notification problem.
pub async fn publish_after_commit(writer: &AccountEventWriter, event: AccountEvent) {
    match writer.publish(&event).await {
        Ok(stream_id) => {
            tracing::debug!(
                op = event.op(),
                public_id = %event.public_id(),
                stream_id = %stream_id,
                "Account event published"
            );
        }
        Err(e) => {
            // The mirror will diverge until the account is mutated again.
            tracing::error!(
                op = event.op(),
                public_id = %event.public_id(),
                error = %e,
                "Failed to publish account event; local commit stands"
            );
        }
    }
}
