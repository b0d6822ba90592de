//! Pending-work queues
//!
//! This module handles:
//! - The `Scheduler` trait the dispatch loop polls
//! - FIFO (default), LIFO and priority orderings
//!
//! All implementations are safe to push to from many worker tasks while the
//! dispatch loop polls.

use crate::item::WorkItem;
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A thread-safe queue of work items not yet dispatched
pub trait Scheduler: Send + Sync {
    /// Adds an item to the queue
    fn push(&self, item: WorkItem);

    /// Removes and returns the next item, or `None` if the queue is empty
    fn poll(&self) -> Option<WorkItem>;

    /// Number of items currently queued
    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Queue ordering selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    #[default]
    Fifo,
    Lifo,
    Priority,
}

impl QueueKind {
    /// Builds an empty scheduler with this ordering
    pub fn build(self) -> Box<dyn Scheduler> {
        match self {
            QueueKind::Fifo => Box::new(FifoScheduler::new()),
            QueueKind::Lifo => Box::new(LifoScheduler::new()),
            QueueKind::Priority => Box::new(PriorityScheduler::new()),
        }
    }
}

// Queue operations never leave the collection half-updated, so a poisoned
// lock still guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// First-in, first-out queue
#[derive(Debug, Default)]
pub struct FifoScheduler {
    queue: Mutex<VecDeque<WorkItem>>,
}

impl FifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for FifoScheduler {
    fn push(&self, item: WorkItem) {
        lock(&self.queue).push_back(item);
    }

    fn poll(&self) -> Option<WorkItem> {
        lock(&self.queue).pop_front()
    }

    fn count(&self) -> usize {
        lock(&self.queue).len()
    }
}

/// Last-in, first-out queue (depth-first crawl order)
#[derive(Debug, Default)]
pub struct LifoScheduler {
    stack: Mutex<Vec<WorkItem>>,
}

impl LifoScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for LifoScheduler {
    fn push(&self, item: WorkItem) {
        lock(&self.stack).push(item);
    }

    fn poll(&self) -> Option<WorkItem> {
        lock(&self.stack).pop()
    }

    fn count(&self) -> usize {
        lock(&self.stack).len()
    }
}

/// A work item tagged with its arrival sequence for stable priority ordering
#[derive(Debug)]
struct Prioritized {
    item: WorkItem,
    seq: u64,
}

// BinaryHeap is a max-heap: lower priority values and earlier arrivals must
// compare as greater so they are popped first.
impl Ord for Prioritized {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .item
            .priority
            .cmp(&self.item.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Prioritized {}

#[derive(Debug, Default)]
struct PriorityState {
    heap: BinaryHeap<Prioritized>,
    next_seq: u64,
}

/// Priority queue keyed on `WorkItem::priority`
///
/// Lower values are polled first; items of equal priority come out in push order.
#[derive(Debug, Default)]
pub struct PriorityScheduler {
    state: Mutex<PriorityState>,
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for PriorityScheduler {
    fn push(&self, item: WorkItem) {
        let mut state = lock(&self.state);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.heap.push(Prioritized { item, seq });
    }

    fn poll(&self) -> Option<WorkItem> {
        lock(&self.state).heap.pop().map(|p| p.item)
    }

    fn count(&self) -> usize {
        lock(&self.state).heap.len()
    }
}
