//! StreamConsumer - poll/process/acknowledge loop

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    AnalysisClient, ConsumerIdentity, GroupStatus, PipelineError, RawStreamEntry, StreamBroker,
    StreamRecord,
};
use dispatcher::AnalysisDispatcher;
use observability::MetricsCollector;

use crate::breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::decode::decode_entry;

/// Backpressure sleep while the circuit is open
const OPEN_CIRCUIT_BACKOFF: Duration = Duration::from_millis(500);

/// Backoff after a failed poll iteration
const POLL_ERROR_BACKOFF: Duration = Duration::from_millis(250);

/// The interaction-stream consumer loop.
///
/// Owns the broker connection and the circuit-breaker state for one
/// consumer process. Entries are processed and acknowledged strictly in the
/// order the broker returned them; a transient failure never terminates the
/// loop, only cancellation does.
pub struct StreamConsumer<B, A>
where
    B: StreamBroker,
    A: AnalysisClient,
{
    broker: B,
    identity: ConsumerIdentity,
    breaker: CircuitBreaker,
    dispatcher: AnalysisDispatcher<A>,
    collector: Arc<MetricsCollector>,
    cancel: CancellationToken,
}

impl<B, A> StreamConsumer<B, A>
where
    B: StreamBroker + Send + Sync + 'static,
    A: AnalysisClient + Send + Sync + 'static,
{
    /// Assemble a consumer
    pub fn new(
        broker: B,
        identity: ConsumerIdentity,
        breaker_config: CircuitBreakerConfig,
        dispatcher: AnalysisDispatcher<A>,
        collector: Arc<MetricsCollector>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            broker,
            identity,
            breaker: CircuitBreaker::new(breaker_config),
            dispatcher,
            collector,
            cancel,
        }
    }

    /// Spawn the consumer as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the consumer loop until cancelled.
    #[instrument(
        name = "consumer_run",
        skip(self),
        fields(
            stream = %self.identity.stream_key,
            group = %self.identity.group,
            consumer = %self.identity.consumer
        )
    )]
    pub async fn run(mut self) {
        self.ensure_group().await;

        info!(
            batch_size = self.identity.batch_size,
            block_ms = self.identity.block_ms,
            "stream consumer started"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if self.breaker.is_open() {
                // Backpressure valve: ease off a failing broker
                debug!("circuit open, backing off");
                if self.sleep_or_cancelled(OPEN_CIRCUIT_BACKOFF).await {
                    break;
                }
                continue;
            }

            match self.poll_once().await {
                Ok(count) if count > 0 => {
                    debug!(entries = count, "batch processed");
                }
                Ok(_) => {}
                Err(e) => {
                    observability::record_poll_failure();
                    error!(error = %e, "stream poll iteration failed");
                    if self.sleep_or_cancelled(POLL_ERROR_BACKOFF).await {
                        break;
                    }
                }
            }
        }

        if let Err(e) = self.broker.disconnect().await {
            warn!(error = %e, "error releasing broker connection");
        }

        info!("stream consumer stopped");
    }

    /// Idempotent group creation at the stream tail. Any creation error is
    /// logged and startup continues: the group may already be healthy.
    async fn ensure_group(&mut self) {
        match self.broker.ensure_group(&self.identity).await {
            Ok(GroupStatus::Created) => {
                info!(group = %self.identity.group, "consumer group created at stream tail");
            }
            Ok(GroupStatus::AlreadyExists) => {
                info!(group = %self.identity.group, "consumer group already exists");
            }
            Err(e) => {
                error!(error = %e, "failed to create consumer group");
            }
        }
    }

    /// One poll cycle: breaker-guarded claim, then in-order processing.
    async fn poll_once(&mut self) -> Result<usize, PipelineError> {
        let batch = self
            .breaker
            .execute(self.broker.read_batch(&self.identity))
            .await?;

        let count = batch.len();
        for entry in &batch {
            self.process_entry(entry).await?;
        }
        Ok(count)
    }

    /// Process one entry: decode, dispatch, acknowledge, record.
    ///
    /// Acknowledgment is sequenced after dispatch: a dispatch error
    /// propagates out and leaves the entry in the broker's pending ledger.
    /// A tolerated "downstream absent" dispatch still acknowledges.
    async fn process_entry(&mut self, entry: &RawStreamEntry) -> Result<(), PipelineError> {
        let started = Instant::now();

        self.route_entry(entry).await?;
        self.broker.acknowledge(&self.identity, &entry.id).await?;

        let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
        self.collector.record_latency(latency_ms);
        self.collector.record_throughput();
        observability::record_entry_latency_ms(latency_ms);
        observability::record_entry_processed();

        Ok(())
    }

    async fn route_entry(&self, entry: &RawStreamEntry) -> Result<(), PipelineError> {
        match decode_entry(entry) {
            None => {
                // Malformed data is discarded, not retried indefinitely
                warn!(entry_id = %entry.id, "discarding malformed stream entry");
                observability::record_entry_discarded();
                Ok(())
            }
            Some(StreamRecord::Alert(alert)) => {
                let ack = self.dispatcher.emit_burnout_alert(&alert).await?;
                observability::record_dispatch("alerts", ack.is_some());
                Ok(())
            }
            Some(StreamRecord::Interaction(event)) => {
                let ack = self
                    .dispatcher
                    .publish_interactions(std::slice::from_ref(&event))
                    .await?;
                observability::record_dispatch("interactions", ack.is_some());
                Ok(())
            }
        }
    }

    async fn sleep_or_cancelled(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = tokio::time::sleep(duration) => false,
        }
    }
}
