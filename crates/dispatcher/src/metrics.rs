//! Dispatch metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use contracts::DeliveryReport;

/// Counters for one dispatcher worker
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Current queue length
    queue_len: AtomicUsize,
    /// Broadcast jobs completed
    jobs_run: AtomicU64,
    /// Broadcast jobs aborted before any delivery (registry unreadable)
    jobs_failed: AtomicU64,
    /// Jobs dropped because the queue was full
    jobs_dropped: AtomicU64,
    /// Successful deliveries across all jobs
    deliveries_ok: AtomicU64,
    /// Failed deliveries across all jobs
    deliveries_failed: AtomicU64,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_len(&self) -> usize {
        self.queue_len.load(Ordering::Relaxed)
    }

    pub fn set_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    pub fn jobs_run(&self) -> u64 {
        self.jobs_run.load(Ordering::Relaxed)
    }

    pub fn jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    pub fn inc_jobs_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn jobs_dropped(&self) -> u64 {
        self.jobs_dropped.load(Ordering::Relaxed)
    }

    pub fn inc_jobs_dropped(&self) {
        self.jobs_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn deliveries_ok(&self) -> u64 {
        self.deliveries_ok.load(Ordering::Relaxed)
    }

    pub fn deliveries_failed(&self) -> u64 {
        self.deliveries_failed.load(Ordering::Relaxed)
    }

    /// Fold a finished broadcast into the counters
    pub fn record_report(&self, report: &DeliveryReport) {
        self.jobs_run.fetch_add(1, Ordering::Relaxed);
        self.deliveries_ok
            .fetch_add(report.delivered() as u64, Ordering::Relaxed);
        self.deliveries_failed
            .fetch_add(report.failed() as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queue_len: self.queue_len(),
            jobs_run: self.jobs_run(),
            jobs_failed: self.jobs_failed(),
            jobs_dropped: self.jobs_dropped(),
            deliveries_ok: self.deliveries_ok(),
            deliveries_failed: self.deliveries_failed(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queue_len: usize,
    pub jobs_run: u64,
    pub jobs_failed: u64,
    pub jobs_dropped: u64,
    pub deliveries_ok: u64,
    pub deliveries_failed: u64,
}
