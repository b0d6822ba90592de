//! Retry ledger
//!
//! Tracks how many times each fingerprint has failed. The read, increment and
//! decide steps happen under a single lock so that concurrent failures of items
//! sharing a target are counted exactly once each.

use crate::item::Fingerprint;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// What the engine should do with an item after a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enqueue the item; `attempt` is the number of failures so far
    Retry { attempt: u32 },

    /// The budget is spent; drop the item
    GiveUp { attempts: u32 },
}

/// Mapping from fingerprint to failure count
#[derive(Debug, Default)]
pub struct RetryLedger {
    failures: Mutex<HashMap<Fingerprint, u32>>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn failures(&self) -> MutexGuard<'_, HashMap<Fingerprint, u32>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one failure and decides whether the item gets another attempt
    ///
    /// The entry is created on first failure and removed once the count exceeds
    /// `max_attempts`.
    pub fn record_failure(&self, fingerprint: Fingerprint, max_attempts: u32) -> RetryDecision {
        let mut failures = self.failures();
        let count = failures.entry(fingerprint).or_insert(0);
        *count += 1;
        let attempt = *count;

        if attempt <= max_attempts {
            RetryDecision::Retry { attempt }
        } else {
            failures.remove(&fingerprint);
            RetryDecision::GiveUp { attempts: attempt }
        }
    }

    /// Forgets a fingerprint after a successful fetch
    pub fn clear(&self, fingerprint: &Fingerprint) {
        self.failures().remove(fingerprint);
    }

    /// Current failure count for a fingerprint
    pub fn attempts(&self, fingerprint: &Fingerprint) -> Option<u32> {
        self.failures().get(fingerprint).copied()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.failures().contains_key(fingerprint)
    }

    /// Number of fingerprints currently failing
    pub fn len(&self) -> usize {
        self.failures().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_retries_until_budget_then_gives_up() {
        let ledger = RetryLedger::new();
        let fp = Fingerprint::of("https://example.com/");

        assert_eq!(ledger.record_failure(fp, 2), RetryDecision::Retry { attempt: 1 });
        assert_eq!(ledger.attempts(&fp), Some(1));
        assert_eq!(ledger.record_failure(fp, 2), RetryDecision::Retry { attempt: 2 });
        assert_eq!(ledger.record_failure(fp, 2), RetryDecision::GiveUp { attempts: 3 });
        assert!(!ledger.contains(&fp));
    }

    #[test]
    fn test_zero_budget_gives_up_immediately() {
        let ledger = RetryLedger::new();
        let fp = Fingerprint::of("https://example.com/");

        assert_eq!(ledger.record_failure(fp, 0), RetryDecision::GiveUp { attempts: 1 });
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_clear_removes_entry() {
        let ledger = RetryLedger::new();
        let fp = Fingerprint::of("https://example.com/");

        ledger.record_failure(fp, 5);
        ledger.clear(&fp);
        assert!(!ledger.contains(&fp));
        assert_eq!(ledger.record_failure(fp, 5), RetryDecision::Retry { attempt: 1 });
    }

    #[test]
    fn test_same_target_shares_entry() {
        let ledger = RetryLedger::new();
        ledger.record_failure(Fingerprint::of("https://example.com/a"), 3);
        ledger.record_failure(Fingerprint::of("https://example.com/a"), 3);
        ledger.record_failure(Fingerprint::of("https://example.com/b"), 3);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.attempts(&Fingerprint::of("https://example.com/a")), Some(2));
    }

    #[test]
    fn test_concurrent_failures_counted_once_each() {
        let ledger = Arc::new(RetryLedger::new());
        let fp = Fingerprint::of("https://example.com/shared");
        let mut handles = Vec::new();

        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            handles.push(std::thread::spawn(move || {
                let mut retries = 0;
                for _ in 0..10 {
                    if let RetryDecision::Retry { .. } = ledger.record_failure(fp, 1000) {
                        retries += 1;
                    }
                }
                retries
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 80);
        assert_eq!(ledger.attempts(&fp), Some(80));
    }
}
