/// Account event consumption
///
/// Blocking batched reads from the `account` stream for the mirror consumer
/// loop. The reader returns raw field maps rather than decoded events so the
/// consumer can count and skip malformed entries without losing its position
/// in the stream.
///
/// # Example
///
/// ```no_run
/// use taskmesh_shared::redis::client::{RedisClient, RedisConfig};
/// use taskmesh_shared::redis::stream_reader::AccountEventReader;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// let reader = AccountEventReader::new(client);
///
/// let mut last_id = "0".to_string();
/// loop {
///     let entries = reader.read_block(&last_id, 5000, 100).await?;
///     for (stream_id, fields) in entries {
///         println!("entry {} with {} fields", stream_id, fields.len());
///         last_id = stream_id;
///     }
/// }
/// # Ok(())
/// # }
/// ```

use crate::events::ACCOUNT_STREAM;
use crate::redis::client::RedisClient;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use std::collections::HashMap;
use thiserror::Error;

/// Stream reader errors
#[derive(Error, Debug)]
pub enum StreamReaderError {
    /// Raw Redis error
    #[error("Redis command error: {0}")]
    RedisCommandError(#[from] redis::RedisError),
}

/// Reader for the account event channel
#[derive(Clone)]
pub struct AccountEventReader {
    client: RedisClient,
}

impl AccountEventReader {
    /// Creates a new reader
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Reads the next batch of entries after `last_id`
    ///
    /// Uses XREAD BLOCK so the call waits up to `block_ms` milliseconds for
    /// new entries before returning an empty batch.
    ///
    /// # Arguments
    ///
    /// * `last_id` - Stream ID to resume after ("0" for the beginning, "$"
    ///   for only-new)
    /// * `block_ms` - Milliseconds to block waiting for entries
    /// * `count` - Maximum entries per batch
    ///
    /// # Returns
    ///
    /// Vector of (stream_id, fields) tuples in arrival order. Field values
    /// that are not valid UTF-8 strings are dropped from the map; the
    /// consumer treats the resulting incomplete entry as malformed.
    pub async fn read_block(
        &self,
        last_id: &str,
        block_ms: usize,
        count: usize,
    ) -> Result<Vec<(String, HashMap<String, String>)>, StreamReaderError> {
        let mut conn = self.client.get_connection();

        let opts = StreamReadOptions::default().count(count).block(block_ms);
        let reply: StreamReadReply = conn
            .xread_options(&[ACCOUNT_STREAM], &[last_id], &opts)
            .await?;

        let mut entries = Vec::new();

        for stream_key_result in reply.keys {
            for stream_id_result in stream_key_result.ids {
                let stream_id = stream_id_result.id;

                let fields: HashMap<String, String> = stream_id_result
                    .map
                    .into_iter()
                    .filter_map(|(key, value)| {
                        let value = redis::from_redis_value::<String>(&value).ok()?;
                        Some((key, value))
                    })
                    .collect();

                entries.push((stream_id, fields));
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{serialize_event, AccountEvent};
    use crate::redis::client::RedisConfig;
    use crate::redis::stream_writer::AccountEventWriter;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_read_after_write() {
        let client = RedisClient::new(RedisConfig::default_for_test())
            .await
            .unwrap();
        let writer = AccountEventWriter::new(client.clone());
        let reader = AccountEventReader::new(client);

        let event = AccountEvent::Deleted {
            user_id: Uuid::new_v4(),
        };
        let written_id = writer.publish(&event).await.unwrap();

        let entries = reader.read_block("0", 100, 1000).await.unwrap();
        let found = entries
            .iter()
            .find(|(id, _)| *id == written_id)
            .expect("written entry should be readable");

        assert_eq!(found.1, serialize_event(&event).unwrap());
    }
}
