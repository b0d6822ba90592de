//! Non-blocking concurrency budget
//!
//! The resource manager hands out at most `limit` slots at a time. Allocation never
//! waits: when the budget is exhausted `try_alloc` returns `None` and the caller is
//! expected to back off and poll again.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounded counter of in-flight tasks
#[derive(Debug, Clone)]
pub struct ResourceManager {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// One reserved unit of the concurrency budget
///
/// Dropping the slot releases it, so every successful allocation is paired with
/// exactly one release on every exit path of the task that holds it.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl Slot {
    /// Releases the slot
    pub fn release(self) {}
}

impl ResourceManager {
    /// Creates a manager with `limit` slots
    ///
    /// A zero limit is rejected by config validation before a manager is built.
    pub fn new(limit: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Attempts to reserve one slot without waiting
    pub fn try_alloc(&self) -> Option<Slot> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| Slot { _permit: permit })
    }

    /// Number of slots currently held
    ///
    /// Only meaningful for quiescence checks; capacity decisions go through
    /// `try_alloc`.
    pub fn count(&self) -> usize {
        self.limit - self.semaphore.available_permits()
    }

    /// The configured concurrency limit
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_up_to_limit() {
        let manager = ResourceManager::new(2);

        let a = manager.try_alloc();
        let b = manager.try_alloc();
        assert!(a.is_some());
        assert!(b.is_some());
        assert_eq!(manager.count(), 2);

        assert!(manager.try_alloc().is_none());
        assert_eq!(manager.count(), 2);
    }

    #[test]
    fn test_release_frees_slot() {
        let manager = ResourceManager::new(1);

        let slot = manager.try_alloc().unwrap();
        assert!(manager.try_alloc().is_none());

        slot.release();
        assert_eq!(manager.count(), 0);
        assert!(manager.try_alloc().is_some());
    }

    #[test]
    fn test_drop_releases_slot() {
        let manager = ResourceManager::new(1);
        {
            let _slot = manager.try_alloc().unwrap();
            assert_eq!(manager.count(), 1);
        }
        assert_eq!(manager.count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_count_never_exceeds_limit_under_contention() {
        let manager = ResourceManager::new(3);
        let mut handles = Vec::new();

        for _ in 0..32 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    if let Some(slot) = manager.try_alloc() {
                        assert!(manager.count() <= manager.limit());
                        tokio::task::yield_now().await;
                        slot.release();
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(manager.count(), 0);
    }
}
