//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Jobs (results by stage, duration)
//! - Transfer volume (source and archive bytes)
//! - Notifications (deliveries by type and outcome)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Jobs
// =============================================================================

/// Jobs total by result and the stage they ended in.
pub static JOBS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("archivist_jobs_total", "Total jobs processed"),
        &["result", "stage"], // result: "success", "failure"
    )
    .unwrap()
});

/// Job duration in seconds.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("archivist_job_duration_seconds", "Duration of a job run")
            .buckets(vec![0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 900.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Transfer volume
// =============================================================================

/// Bytes downloaded from source objects.
pub static SOURCE_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "archivist_source_bytes_total",
        "Total bytes downloaded from source objects",
    )
    .unwrap()
});

/// Bytes uploaded as archives.
pub static ARCHIVE_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "archivist_archive_bytes_total",
        "Total bytes uploaded as archives",
    )
    .unwrap()
});

/// Archive size per job.
pub static ARCHIVE_SIZE: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("archivist_archive_size_bytes", "Size of produced archives")
            .buckets(prometheus::exponential_buckets(1024.0, 8.0, 9).unwrap()),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Notifications
// =============================================================================

/// Notifications by type and outcome.
pub static NOTIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("archivist_notifications_total", "Total notifications"),
        &["type", "outcome"], // outcome: "delivered", "failed", "skipped"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Jobs
        Box::new(JOBS_TOTAL.clone()),
        Box::new(JOB_DURATION.clone()),
        // Transfer volume
        Box::new(SOURCE_BYTES.clone()),
        Box::new(ARCHIVE_BYTES.clone()),
        Box::new(ARCHIVE_SIZE.clone()),
        // Notifications
        Box::new(NOTIFICATIONS_TOTAL.clone()),
    ]
}
