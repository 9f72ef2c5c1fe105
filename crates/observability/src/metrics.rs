//! Consumer-loop metric recording over the `metrics` facade.
//!
//! These complement the in-process `MetricsCollector`: the collector feeds
//! the synchronous snapshot, the facade feeds the Prometheus exporter.

use metrics::{counter, histogram};

/// Record one fully processed (acknowledged) entry
pub fn record_entry_processed() {
    counter!("pipeline_entries_processed_total").increment(1);
}

/// Record one malformed entry discarded at the decode boundary
pub fn record_entry_discarded() {
    counter!("pipeline_entries_discarded_total").increment(1);
}

/// Record per-entry processing latency
pub fn record_entry_latency_ms(latency_ms: f64) {
    histogram!("pipeline_entry_latency_ms").record(latency_ms);
}

/// Record a dispatch attempt per channel; `delivered` is false when the
/// downstream was absent
pub fn record_dispatch(channel: &'static str, delivered: bool) {
    let status = if delivered { "delivered" } else { "absent" };
    counter!(
        "pipeline_dispatches_total",
        "channel" => channel,
        "status" => status
    )
    .increment(1);
}

/// Record a failed poll iteration (broker unreachable, protocol error)
pub fn record_poll_failure() {
    counter!("pipeline_poll_failures_total").increment(1);
}

/// Record a circuit-breaker open transition
pub fn record_circuit_opened() {
    counter!("pipeline_circuit_opened_total").increment(1);
}
