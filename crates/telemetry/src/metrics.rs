//! In-process metrics.
//!
//! Lock-free counters read by `/api/status` and the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds. Values past the last bound land in
    /// the last bucket.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let index = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[index].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum.load(Ordering::Relaxed) as f64 / count as f64
        }
    }

    /// Returns `(upper bound ms, count)` pairs.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the relay.
#[derive(Debug, Default)]
pub struct Metrics {
    // Ingest
    pub upload_requests: Counter,
    pub records_accepted: Counter,
    pub records_rejected: Counter,
    pub archive_write_errors: Counter,

    // Buffer / sink
    pub flushes_attempted: Counter,
    pub flushes_succeeded: Counter,
    pub flush_failures: Counter,
    pub records_flushed: Counter,
    pub records_requeued: Counter,

    // Latency
    pub ingest_latency_ms: Histogram,
    pub flush_latency_ms: Histogram,

    // Gauges
    pub buffer_depth: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            upload_requests: self.upload_requests.get(),
            records_accepted: self.records_accepted.get(),
            records_rejected: self.records_rejected.get(),
            archive_write_errors: self.archive_write_errors.get(),
            flushes_attempted: self.flushes_attempted.get(),
            flushes_succeeded: self.flushes_succeeded.get(),
            flush_failures: self.flush_failures.get(),
            records_flushed: self.records_flushed.get(),
            records_requeued: self.records_requeued.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            flush_latency_mean_ms: self.flush_latency_ms.mean(),
            buffer_depth: self.buffer_depth.get(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub upload_requests: u64,
    pub records_accepted: u64,
    pub records_rejected: u64,
    pub archive_write_errors: u64,
    pub flushes_attempted: u64,
    pub flushes_succeeded: u64,
    pub flush_failures: u64,
    pub records_flushed: u64,
    pub records_requeued: u64,
    pub ingest_latency_mean_ms: f64,
    pub flush_latency_mean_ms: f64,
    pub buffer_depth: u64,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
