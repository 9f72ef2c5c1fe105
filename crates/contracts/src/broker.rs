//! StreamBroker trait - ordered-log broker abstraction
//!
//! Defines the consumer-group operations the pipeline needs from the broker,
//! decoupling the consumer loop from a concrete client. Supports unified
//! handling of the real Redis client and mock brokers in tests.

use crate::{ConsumerIdentity, PipelineError, RawStreamEntry};

/// Outcome of the idempotent group-creation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    /// Group freshly created at the stream tail
    Created,
    /// Group already present; treated as success
    AlreadyExists,
}

/// Ordered-log broker with consumer-group semantics
///
/// All broker implementations must implement this trait. Entries returned by
/// `read_batch` are new deliveries only (the `>` cursor): never before handed
/// to any consumer in the group.
#[trait_variant::make(StreamBroker: Send)]
pub trait LocalStreamBroker {
    /// Idempotently ensure the consumer group exists at the stream tail.
    ///
    /// A broker "group already exists" reply maps to
    /// `GroupStatus::AlreadyExists`, not an error.
    async fn ensure_group(
        &mut self,
        identity: &ConsumerIdentity,
    ) -> Result<GroupStatus, PipelineError>;

    /// Claim up to `identity.batch_size` undelivered entries for this
    /// consumer, blocking up to `identity.block_ms`. A block timeout yields
    /// an empty batch.
    async fn read_batch(
        &mut self,
        identity: &ConsumerIdentity,
    ) -> Result<Vec<RawStreamEntry>, PipelineError>;

    /// Acknowledge one entry id within the group, removing it from the
    /// broker's pending-entries ledger for this consumer.
    async fn acknowledge(
        &mut self,
        identity: &ConsumerIdentity,
        entry_id: &str,
    ) -> Result<(), PipelineError>;

    /// Release the broker connection.
    async fn disconnect(&mut self) -> Result<(), PipelineError>;
}
