//! `run` command implementation.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use broker::RedisStreamBroker;
use consumer::{CircuitBreakerConfig, StreamConsumer};
use dispatcher::{AnalysisDispatcher, HttpAnalysisClient};
use observability::MetricsCollector;

use crate::cli::RunArgs;
use crate::commands::identity_from_args;

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    let identity = identity_from_args(args)
        .validated()
        .context("Invalid consumer configuration")?;

    info!(
        stream = %identity.stream_key,
        group = %identity.group,
        consumer = %identity.consumer,
        batch_size = identity.batch_size,
        block_ms = identity.block_ms,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let broker = RedisStreamBroker::connect(&args.redis_url)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", args.redis_url))?;

    let client = match &args.analyzer_url {
        Some(url) => HttpAnalysisClient::new(
            url.clone(),
            Duration::from_millis(args.dispatch_timeout_ms),
        )
        .context("Failed to build analysis client")?,
        None => {
            warn!("no analyzer URL configured, dispatch acknowledgments will be absent");
            HttpAnalysisClient::disconnected()
        }
    };

    let breaker_config = CircuitBreakerConfig {
        failure_threshold: args.failure_threshold,
        cooldown: Duration::from_millis(args.cooldown_ms),
    };

    let collector = Arc::new(MetricsCollector::new());
    let cancel = CancellationToken::new();

    let handle = StreamConsumer::new(
        broker,
        identity,
        breaker_config,
        AnalysisDispatcher::new(client),
        Arc::clone(&collector),
        cancel.clone(),
    )
    .spawn();

    info!("Pipeline started, waiting for shutdown signal");

    shutdown_signal().await;
    warn!("Received shutdown signal, stopping consumer...");

    cancel.cancel();
    handle.await.context("Consumer task panicked")?;

    let snapshot = collector.snapshot();
    info!(
        observed_events = snapshot.observed_events,
        throughput_per_minute = snapshot.throughput_per_minute,
        average_latency_ms = snapshot.latency.average_ms,
        p95_latency_ms = snapshot.latency.p95_ms,
        "Pipeline finished"
    );

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
