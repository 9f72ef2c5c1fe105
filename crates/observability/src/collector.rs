//! Rolling latency/throughput collector.
//!
//! Memory-bounded: the latency ring keeps the most recent 5000 samples and
//! statistics are computed over the most recent 1000; the throughput window
//! holds only timestamps inside the trailing 60 s and is trimmed on every
//! read and write.

use std::collections::VecDeque;
use std::sync::Mutex;

use contracts::now_millis;

/// Latency ring capacity; oldest samples are evicted past this
const MAX_LATENCY_SAMPLES: usize = 5_000;

/// Statistics are computed over this many most-recent samples
const RECENT_SAMPLE_LIMIT: usize = 1_000;

/// Trailing throughput window in milliseconds
const WINDOW_MS: i64 = 60_000;

/// Point-in-time pipeline metrics snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineMetrics {
    /// Event count inside the trailing window, scaled per minute
    pub throughput_per_minute: u64,
    /// Event count inside the trailing window
    pub observed_events: u64,
    /// Latency statistics over the recent samples
    pub latency: LatencySummary,
}

/// Latency statistics over the most recent samples
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub count: u64,
    /// Mean in milliseconds, 2-decimal rounding
    pub average_ms: f64,
    /// 95th percentile in milliseconds, 2-decimal rounding
    pub p95_ms: f64,
}

#[derive(Debug, Default)]
struct Inner {
    latencies: VecDeque<f64>,
    throughput_window: VecDeque<i64>,
}

/// Lightweight observability collector, no external dependencies.
///
/// Mutated only from the single polling task; the mutex exists so the
/// snapshot can be read from a health/monitoring context.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    inner: Mutex<Inner>,
}

impl MetricsCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one per-entry processing latency. Non-finite values are ignored.
    pub fn record_latency(&self, duration_ms: f64) {
        if !duration_ms.is_finite() {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.latencies.push_back(duration_ms);
        if inner.latencies.len() > MAX_LATENCY_SAMPLES {
            inner.latencies.pop_front();
        }
    }

    /// Record one processed event into the throughput window
    pub fn record_throughput(&self) {
        self.record_throughput_at(now_millis());
    }

    /// Compute the current snapshot, trimming the throughput window first
    pub fn snapshot(&self) -> PipelineMetrics {
        self.snapshot_at(now_millis())
    }

    fn record_throughput_at(&self, now_ms: i64) {
        let mut inner = self.inner.lock().unwrap();
        inner.throughput_window.push_back(now_ms);
        Self::trim_window(&mut inner, now_ms);
    }

    fn snapshot_at(&self, now_ms: i64) -> PipelineMetrics {
        let mut inner = self.inner.lock().unwrap();
        Self::trim_window(&mut inner, now_ms);

        let observed_events = inner.throughput_window.len() as u64;
        // The fixed 60 s window is already a per-minute count; the scaling
        // expression is kept explicit so a window change surfaces here.
        let throughput_per_minute =
            ((observed_events as f64 / WINDOW_MS as f64) * 60_000.0).round() as u64;

        let recent_start = inner.latencies.len().saturating_sub(RECENT_SAMPLE_LIMIT);
        let recent: Vec<f64> = inner.latencies.iter().skip(recent_start).copied().collect();

        PipelineMetrics {
            throughput_per_minute,
            observed_events,
            latency: Self::summarize(&recent),
        }
    }

    fn summarize(recent: &[f64]) -> LatencySummary {
        let count = recent.len() as u64;
        if count == 0 {
            return LatencySummary {
                count: 0,
                average_ms: 0.0,
                p95_ms: 0.0,
            };
        }

        let average = recent.iter().sum::<f64>() / count as f64;

        let mut sorted = recent.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let p95 = Self::percentile(&sorted, 0.95);

        LatencySummary {
            count,
            average_ms: round2(average),
            p95_ms: round2(p95),
        }
    }

    /// Value at index `ceil(p * n) - 1` of the ascending-sorted samples,
    /// clamped to index 0.
    fn percentile(sorted: &[f64], percentile: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let index = (percentile * sorted.len() as f64).ceil() as usize;
        sorted[index.saturating_sub(1).min(sorted.len() - 1)]
    }

    fn trim_window(inner: &mut Inner, reference_ms: i64) {
        let limit = reference_ms - WINDOW_MS;
        while inner
            .throughput_window
            .front()
            .is_some_and(|&ts| ts < limit)
        {
            inner.throughput_window.pop_front();
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
