//! Metrics registry for confcentral
//!
//! - Counters only (no gauges, no histograms)
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing all operational counters
///
/// # Thread Safety
///
/// All counters use atomic operations for thread-safe increments.
/// Uses Relaxed ordering; readers only need eventually consistent values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Plans built successfully
    queries_planned: AtomicU64,
    /// Filter lists rejected by validation
    queries_rejected: AtomicU64,
    /// Speaker rosters recorded into the tally
    tally_bumps: AtomicU64,
    /// Featured speaker resolutions
    featured_resolves: AtomicU64,
    /// Failed featured speaker write-backs
    writeback_failures: AtomicU64,
    /// Tasks handed to the dispatcher
    tasks_dispatched: AtomicU64,
    /// Tasks handled successfully
    tasks_completed: AtomicU64,
    /// Task handler failures (each attempt counts)
    tasks_failed: AtomicU64,
    /// Announcement refreshes
    announcements_refreshed: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Query metrics

    pub fn increment_queries_planned(&self) {
        self.queries_planned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    // Featured speaker metrics

    pub fn increment_tally_bumps(&self) {
        self.tally_bumps.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_featured_resolves(&self) {
        self.featured_resolves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_writeback_failures(&self) {
        self.writeback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_announcements_refreshed(&self) {
        self.announcements_refreshed.fetch_add(1, Ordering::Relaxed);
    }

    // Task metrics

    pub fn increment_tasks_dispatched(&self) {
        self.tasks_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_tasks_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_planned: self.queries_planned.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            tally_bumps: self.tally_bumps.load(Ordering::Relaxed),
            featured_resolves: self.featured_resolves.load(Ordering::Relaxed),
            writeback_failures: self.writeback_failures.load(Ordering::Relaxed),
            tasks_dispatched: self.tasks_dispatched.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            announcements_refreshed: self.announcements_refreshed.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_planned: u64,
    pub queries_rejected: u64,
    pub tally_bumps: u64,
    pub featured_resolves: u64,
    pub writeback_failures: u64,
    pub tasks_dispatched: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub announcements_refreshed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();

        assert_eq!(snapshot.queries_planned, 0);
        assert_eq!(snapshot.tally_bumps, 0);
        assert_eq!(snapshot.tasks_failed, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_queries_planned();
        registry.increment_queries_planned();
        registry.increment_queries_rejected();
        registry.increment_tally_bumps();
        registry.increment_featured_resolves();
        registry.increment_writeback_failures();
        registry.increment_tasks_dispatched();
        registry.increment_tasks_completed();
        registry.increment_tasks_failed();
        registry.increment_announcements_refreshed();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.queries_planned, 2);
        assert_eq!(snapshot.queries_rejected, 1);
        assert_eq!(snapshot.tally_bumps, 1);
        assert_eq!(snapshot.featured_resolves, 1);
        assert_eq!(snapshot.writeback_failures, 1);
        assert_eq!(snapshot.tasks_dispatched, 1);
        assert_eq!(snapshot.tasks_completed, 1);
        assert_eq!(snapshot.tasks_failed, 1);
        assert_eq!(snapshot.announcements_refreshed, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_tally_bumps();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["tally_bumps"], 1);
        assert_eq!(parsed["queries_planned"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_tally_bumps();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().tally_bumps, 1000);
    }
}
