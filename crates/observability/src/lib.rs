//! # Observability
//!
//! In-process pipeline metrics plus Prometheus export.
//!
//! ## Features
//!
//! - `MetricsCollector`: memory-bounded latency/throughput snapshot
//! - Prometheus exporter bootstrap
//! - `metrics`-facade recording helpers for the consumer loop
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use observability::MetricsCollector;
//!
//! observability::init_metrics_only(9000)?;
//!
//! let collector = Arc::new(MetricsCollector::new());
//! collector.record_latency(12.5);
//! collector.record_throughput();
//! let snapshot = collector.snapshot();
//! ```

mod collector;
pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;

pub use collector::{LatencySummary, MetricsCollector, PipelineMetrics};
pub use metrics::{
    record_circuit_opened, record_dispatch, record_entry_discarded, record_entry_latency_ms,
    record_entry_processed, record_poll_failure,
};

/// Install the Prometheus metrics exporter on `0.0.0.0:<port>`.
///
/// Tracing is initialized separately by the binary.
pub fn init_metrics_only(port: u16) -> Result<()> {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
