/// Account event publication
///
/// Writes account lifecycle events to the `account` Redis stream using XADD
/// with bounded exponential backoff. Publication happens *after* the local
/// database commit; if every attempt fails the committed mutation stands and
/// the loss is logged — the channel is at-least-once, not exactly-once, and
/// there is no outbox.
///
/// # Example
///
/// ```no_run
/// use taskmesh_shared::events::AccountEvent;
/// use taskmesh_shared::redis::client::{RedisClient, RedisConfig};
/// use taskmesh_shared::redis::stream_writer::AccountEventWriter;
/// use uuid::Uuid;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// let writer = AccountEventWriter::new(client);
///
/// let stream_id = writer
///     .publish(&AccountEvent::Deleted { user_id: Uuid::new_v4() })
///     .await?;
/// println!("Published event with stream ID: {}", stream_id);
/// # Ok(())
/// # }
/// ```

use crate::events::{serialize_event, AccountEvent, EventError, ACCOUNT_STREAM};
use crate::redis::client::RedisClient;
use redis::AsyncCommands;
use thiserror::Error;

/// Stream writer errors
#[derive(Error, Debug)]
pub enum StreamWriterError {
    /// Event serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] EventError),

    /// Write failed after retries
    #[error("Failed to publish event after {attempts} attempts: {last_error}")]
    WriteFailed { attempts: u32, last_error: String },
}

/// Configuration for writer retry behavior
#[derive(Debug, Clone)]
pub struct StreamWriterConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,

    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
}

impl Default for StreamWriterConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
        }
    }
}

/// Publisher for the account event channel
#[derive(Clone)]
pub struct AccountEventWriter {
    client: RedisClient,
    config: StreamWriterConfig,
}

impl AccountEventWriter {
    /// Creates a writer with default retry configuration
    pub fn new(client: RedisClient) -> Self {
        Self {
            client,
            config: StreamWriterConfig::default(),
        }
    }

    /// Creates a writer with custom retry configuration
    pub fn with_config(client: RedisClient, config: StreamWriterConfig) -> Self {
        Self { client, config }
    }

    /// Publishes one account event to the `account` stream
    ///
    /// # Returns
    ///
    /// The Redis stream entry ID (format: "timestamp-sequence")
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or XADD fails after every
    /// retry. Callers on the publish-after-commit path log this error and
    /// keep the committed mutation.
    pub async fn publish(&self, event: &AccountEvent) -> Result<String, StreamWriterError> {
        let fields = serialize_event(event)?;

        let stream_id = self.xadd_with_retry(&fields).await.map_err(|e| {
            StreamWriterError::WriteFailed {
                attempts: self.config.max_retries + 1,
                last_error: e.to_string(),
            }
        })?;

        tracing::debug!(
            op = event.op(),
            public_id = %event.public_id(),
            stream_id = %stream_id,
            "Published account event"
        );

        Ok(stream_id)
    }

    /// Internal: executes XADD with exponential backoff
    async fn xadd_with_retry(
        &self,
        fields: &std::collections::HashMap<String, String>,
    ) -> Result<String, redis::RedisError> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.config.max_retries {
            let mut conn = self.client.get_connection();

            let items: Vec<(&str, &str)> = fields
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();

            match conn.xadd(ACCOUNT_STREAM, "*", &items).await {
                Ok(stream_id) => return Ok(stream_id),
                Err(e) => {
                    last_error = Some(e);
                    attempt += 1;

                    if attempt <= self.config.max_retries {
                        let delay_ms = std::cmp::min(
                            self.config.base_retry_delay_ms * 2u64.pow(attempt - 1),
                            self.config.max_retry_delay_ms,
                        );

                        tracing::warn!(
                            stream = ACCOUNT_STREAM,
                            attempt = attempt,
                            delay_ms = delay_ms,
                            "XADD failed, retrying..."
                        );

                        tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AccountPayload;
    use crate::models::role::Role;
    use crate::redis::client::RedisConfig;
    use uuid::Uuid;

    #[test]
    fn test_writer_config_default() {
        let config = StreamWriterConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_retry_delay_ms, 100);
        assert_eq!(config.max_retry_delay_ms, 5000);
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_publish_event() {
        let client = RedisClient::new(RedisConfig::default_for_test())
            .await
            .unwrap();
        let writer = AccountEventWriter::new(client);

        let event = AccountEvent::Created(AccountPayload {
            username: Some("writer-test".to_string()),
            first_name: None,
            last_name: None,
            email: None,
            role: Some(Role::Client),
            user_public_id: Uuid::new_v4(),
        });

        let stream_id = writer.publish(&event).await.unwrap();
        assert!(stream_id.contains('-')); // Redis stream ID format: timestamp-sequence
    }
}
