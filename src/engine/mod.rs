//! Dispatch engine
//!
//! This module contains the core of the crawl engine:
//! - A non-blocking concurrency budget (`ResourceManager`)
//! - Pending-work queues (`Scheduler` and its FIFO/LIFO/priority implementations)
//! - The retry ledger and attempt-budget policy
//! - The per-stage hook registry
//! - The poll loop itself (`Engine`)

mod dispatcher;
mod hooks;
mod resource;
mod retry;
mod scheduler;
mod stats;

pub use dispatcher::{Engine, EngineBuilder, LoopState};
pub use hooks::{FetchResultHook, HookRegistry, Plugin, RecordsHook, Stage, WorkItemHook};
pub use resource::{ResourceManager, Slot};
pub use retry::{RetryDecision, RetryLedger};
pub use scheduler::{FifoScheduler, LifoScheduler, PriorityScheduler, QueueKind, Scheduler};
pub use stats::{print_statistics, EngineStats, EngineStatsSnapshot};
