//! # Broker
//!
//! Broker clients for the interaction stream.
//!
//! Responsibilities:
//! - Implement `contracts::StreamBroker` against Redis Streams
//! - Idempotent consumer-group creation at the stream tail
//! - Blocking claims of never-delivered entries (`>` cursor) and acks
//! - Provide a scripted in-memory mock for tests
//!
//! ## Usage Example
//!
//! ```ignore
//! use broker::RedisStreamBroker;
//! use contracts::{ConsumerIdentity, StreamBroker};
//!
//! let mut broker = RedisStreamBroker::connect("redis://127.0.0.1:6379").await?;
//! let identity = ConsumerIdentity::default();
//! broker.ensure_group(&identity).await?;
//! let batch = broker.read_batch(&identity).await?;
//! ```

mod mock;
mod redis_broker;

pub use mock::MockStreamBroker;
pub use redis_broker::RedisStreamBroker;
