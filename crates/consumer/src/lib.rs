//! # Consumer
//!
//! The interaction-stream consumer loop.
//!
//! Responsibilities:
//! - Perpetually claim, decode, dispatch and acknowledge stream entries
//! - Guard broker reads with the circuit breaker (backpressure valve)
//! - Discard malformed entries fail-closed, still acknowledging them
//! - Record per-entry latency and throughput
//!
//! ## Usage Example
//!
//! ```ignore
//! use consumer::{CircuitBreakerConfig, StreamConsumer};
//!
//! let consumer = StreamConsumer::new(
//!     broker,
//!     identity,
//!     CircuitBreakerConfig::default(),
//!     dispatcher,
//!     collector,
//!     cancel.clone(),
//! );
//! let handle = consumer.spawn();
//! // ... later ...
//! cancel.cancel();
//! handle.await?;
//! ```

mod breaker;
mod consumer;
mod decode;

pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use consumer::StreamConsumer;
pub use decode::decode_entry;
