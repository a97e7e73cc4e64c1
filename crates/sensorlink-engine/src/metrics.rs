//! Per-feed metrics collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;

/// A point-in-time view of one feed's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedMetricsSnapshot {
    /// Samples published on every data channel.
    pub emitted: u64,

    /// Individual channel sends that succeeded.
    pub values_sent: u64,

    /// Samples discarded because the feed was off, stale, or disconnected.
    pub dropped: u64,

    /// Encode or send failures.
    pub failed: u64,

    /// Number of Off/On transitions.
    pub transitions: u64,

    /// Seconds since the feed last turned on, zero while off.
    pub uptime_seconds: u64,
}

/// Collects counters for one feed.
pub struct FeedMetrics {
    enabled_at: RwLock<Option<Instant>>,
    emitted: AtomicU64,
    values_sent: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
    transitions: AtomicU64,
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            enabled_at: RwLock::new(None),
            emitted: AtomicU64::new(0),
            values_sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            transitions: AtomicU64::new(0),
        }
    }

    /// Record the feed turning on.
    pub fn record_enabled(&self) {
        *self.enabled_at.write() = Some(Instant::now());
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the feed turning off.
    pub fn record_disabled(&self) {
        *self.enabled_at.write() = None;
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_emitted(&self) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_value_sent(&self) {
        self.values_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        let uptime_seconds = self
            .enabled_at
            .read()
            .map(|since| since.elapsed().as_secs())
            .unwrap_or(0);

        FeedMetricsSnapshot {
            emitted: self.emitted.load(Ordering::Relaxed),
            values_sent: self.values_sent.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            uptime_seconds,
        }
    }
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}
