//! Engine run statistics
//!
//! Counters are bumped from the dispatch loop and from worker tasks, so they are
//! plain atomics read back as a `EngineStatsSnapshot` once the run finishes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one engine
#[derive(Debug, Default)]
pub struct EngineStats {
    enqueued: AtomicU64,
    dispatched: AtomicU64,
    fetch_succeeded: AtomicU64,
    fetch_failed: AtomicU64,
    retried: AtomicU64,
    given_up: AtomicU64,
    records_forwarded: AtomicU64,
}

/// Point-in-time copy of the engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStatsSnapshot {
    /// Pushes onto the queue, including seeds and retries
    pub enqueued: u64,

    /// Items polled and handed to a worker task
    pub dispatched: u64,

    /// Downloader calls that returned a result
    pub fetch_succeeded: u64,

    /// Downloader calls that failed or timed out
    pub fetch_failed: u64,

    /// Failed items pushed back for another attempt
    pub retried: u64,

    /// Failed items dropped after exhausting their budget
    pub given_up: u64,

    /// Record deliveries (one per record per sink)
    pub records_forwarded: u64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_succeeded(&self) {
        self.fetch_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_failed(&self) {
        self.fetch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retried(&self) {
        self.retried.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_given_up(&self) {
        self.given_up.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forwarded(&self) {
        self.records_forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            fetch_succeeded: self.fetch_succeeded.load(Ordering::Relaxed),
            fetch_failed: self.fetch_failed.load(Ordering::Relaxed),
            retried: self.retried.load(Ordering::Relaxed),
            given_up: self.given_up.load(Ordering::Relaxed),
            records_forwarded: self.records_forwarded.load(Ordering::Relaxed),
        }
    }
}

impl EngineStatsSnapshot {
    /// Returns the fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempts = self.fetch_succeeded + self.fetch_failed;
        if attempts == 0 {
            return 0.0;
        }
        (self.fetch_succeeded as f64 / attempts as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &EngineStatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    println!("Queue:");
    println!("  Enqueued: {}", stats.enqueued);
    println!("  Dispatched: {}", stats.dispatched);
    println!();

    println!("Fetches:");
    println!("  Succeeded: {}", stats.fetch_succeeded);
    println!("  Failed: {}", stats.fetch_failed);
    println!("  Retried: {}", stats.retried);
    println!("  Given up: {}", stats.given_up);
    println!();

    println!("Records forwarded: {}", stats.records_forwarded);
    println!(
        "Success Rate: {:.1}% ({} / {} fetch attempts)",
        stats.success_rate(),
        stats.fetch_succeeded,
        stats.fetch_succeeded + stats.fetch_failed
    );
}
