/// Redis integration for the account event channel
///
/// The `account` Redis stream is the durable publish/subscribe channel
/// between the two services:
///
/// ```text
/// ┌──────────────┐
/// │ auth service │ ──XADD──> account (stream)
/// └──────────────┘
///                                │
///                                │ XREAD BLOCK
///                                ▼
///                      ┌─────────────────┐
///                      │ tracker service │  (mirror consumer)
///                      └─────────────────┘
/// ```
///
/// Delivery is at-least-once and arrival-ordered; nothing deduplicates, so
/// the consumer must tolerate replays.
///
/// # Modules
///
/// - `client`: connection management with automatic reconnection
/// - `stream_writer`: event publication with bounded retry
/// - `stream_reader`: blocking batched reads for the consumer loop

pub mod client;
pub mod stream_reader;
pub mod stream_writer;

pub use client::{RedisClient, RedisClientError, RedisConfig};
pub use stream_reader::{AccountEventReader, StreamReaderError};
pub use stream_writer::{AccountEventWriter, StreamWriterConfig, StreamWriterError};
