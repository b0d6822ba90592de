//! Dispatch engine - the bounded-concurrency poll loop
//!
//! The engine owns the pending-work queue, the concurrency budget, the retry
//! ledger and the hook registry. One loop polls the queue; each admitted item
//! runs end-to-end in its own task:
//!
//! 1. pre-fetch hooks, then the downloader
//! 2. on failure, the retry policy (re-enqueue or give up) and stop
//! 3. pre-process hooks, then the processer fills a fresh `Yield`
//! 4. every discovered item goes through pre-enqueue hooks onto the queue
//! 5. pre-sink hooks see the whole record batch, then each record goes to
//!    every sink in registration order
//!
//! Each item is fetched and processed once no matter how many sinks are
//! registered; the sinks share the resulting records.

use crate::config::{validate_engine_config, EngineConfig};
use crate::crawler::{Downloader, Processer};
use crate::engine::hooks::{HookRegistry, Plugin};
use crate::engine::resource::ResourceManager;
use crate::engine::retry::{RetryDecision, RetryLedger};
use crate::engine::scheduler::{FifoScheduler, Scheduler};
use crate::engine::stats::{EngineStats, EngineStatsSnapshot};
use crate::item::{Record, WorkItem, Yield};
use crate::output::Sink;
use crate::{FetchError, FetchOutcome, SkeinError};
use std::sync::Arc;
use std::time::Instant;

/// What one tick of the dispatch loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Queue empty, but tasks are still in flight
    IdlePoll,

    /// Work pending but every slot is taken
    CapacityWait,

    /// One item was polled and handed to a new task
    Dispatch,

    /// Queue empty and nothing in flight
    Done,
}

/// Builder for an `Engine`
///
/// A downloader and a processer are required. The queue defaults to FIFO and
/// sinks and plugins default to none.
pub struct EngineBuilder {
    config: EngineConfig,
    scheduler: Option<Box<dyn Scheduler>>,
    downloader: Option<Arc<dyn Downloader>>,
    processer: Option<Arc<dyn Processer>>,
    sinks: Vec<Arc<dyn Sink>>,
    hooks: HookRegistry,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            scheduler: None,
            downloader: None,
            processer: None,
            sinks: Vec::new(),
            hooks: HookRegistry::new(),
        }
    }

    pub fn scheduler(self, scheduler: impl Scheduler + 'static) -> Self {
        self.boxed_scheduler(Box::new(scheduler))
    }

    pub fn boxed_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn downloader(self, downloader: impl Downloader + 'static) -> Self {
        self.shared_downloader(Arc::new(downloader))
    }

    pub fn shared_downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn processer(self, processer: impl Processer + 'static) -> Self {
        self.shared_processer(Arc::new(processer))
    }

    pub fn shared_processer(mut self, processer: Arc<dyn Processer>) -> Self {
        self.processer = Some(processer);
        self
    }

    /// Appends a sink; records reach sinks in the order they were added
    pub fn sink(self, sink: impl Sink + 'static) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Registers a plugin after any already registered for its stage
    pub fn plugin(mut self, plugin: Plugin) -> Self {
        self.hooks.register(plugin);
        self
    }

    /// Validates the configuration and assembles the engine
    pub fn build(self) -> Result<Engine, SkeinError> {
        validate_engine_config(&self.config)?;

        let downloader = self
            .downloader
            .ok_or_else(|| SkeinError::Build("a downloader is required".to_string()))?;
        let processer = self
            .processer
            .ok_or_else(|| SkeinError::Build("a processer is required".to_string()))?;
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Box::new(FifoScheduler::new()));

        tracing::debug!(
            "Building engine: {} sinks, hooks {:?}",
            self.sinks.len(),
            self.hooks
        );

        Ok(Engine {
            shared: Arc::new(Shared {
                resources: ResourceManager::new(self.config.concurrency_limit),
                config: self.config,
                scheduler,
                downloader,
                processer,
                sinks: self.sinks,
                hooks: self.hooks,
                ledger: RetryLedger::new(),
                stats: EngineStats::new(),
            }),
        })
    }
}

/// State shared between the dispatch loop and every worker task
struct Shared {
    config: EngineConfig,
    scheduler: Box<dyn Scheduler>,
    downloader: Arc<dyn Downloader>,
    processer: Arc<dyn Processer>,
    sinks: Vec<Arc<dyn Sink>>,
    hooks: HookRegistry,
    resources: ResourceManager,
    ledger: RetryLedger,
    stats: EngineStats,
}

/// The crawl dispatch engine
///
/// Cloning is cheap and yields a handle to the same engine.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Enqueues a seed target
    pub fn seed(&self, target: impl Into<String>) {
        self.enqueue(WorkItem::new(target));
    }

    /// Enqueues seed targets in order
    pub fn seed_all<I, S>(&self, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for target in targets {
            self.seed(target);
        }
    }

    /// Runs pre-enqueue hooks on an item and pushes it onto the queue
    pub fn enqueue(&self, item: WorkItem) {
        self.shared.enqueue(item);
    }

    /// Number of items waiting in the queue
    pub fn pending(&self) -> usize {
        self.shared.scheduler.count()
    }

    /// Number of items currently being processed
    pub fn in_flight(&self) -> usize {
        self.shared.resources.count()
    }

    /// Whether the engine has reached quiescence
    pub fn is_done(&self) -> bool {
        self.shared.is_done()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    pub fn retry_ledger(&self) -> &RetryLedger {
        &self.shared.ledger
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Runs the dispatch loop until the queue is empty and no task is in flight
    pub async fn run(&self) -> EngineStatsSnapshot {
        let start_time = Instant::now();
        tracing::info!(
            "Starting engine: {} pending, concurrency limit {}",
            self.pending(),
            self.shared.resources.limit()
        );

        loop {
            match self.tick().await {
                LoopState::Done => break,
                LoopState::CapacityWait => {
                    tracing::trace!("All {} slots busy", self.shared.resources.limit());
                }
                LoopState::IdlePoll | LoopState::Dispatch => {}
            }
        }

        let stats = self.stats();
        tracing::info!(
            "Engine finished in {:?}: {} dispatched, {} fetch failures, {} given up, {} records forwarded",
            start_time.elapsed(),
            stats.dispatched,
            stats.fetch_failed,
            stats.given_up,
            stats.records_forwarded
        );
        stats
    }

    /// Evaluates the loop transition rule once
    ///
    /// Every tick except the terminal one pays the idle wait, even when work is
    /// pending. A tick that finds no free slot additionally pays the busy-poll wait.
    pub async fn tick(&self) -> LoopState {
        let shared = &self.shared;

        if shared.is_done() {
            return LoopState::Done;
        }
        tokio::time::sleep(shared.config.idle_wait()).await;

        if shared.scheduler.count() == 0 {
            return LoopState::IdlePoll;
        }

        let Some(slot) = shared.resources.try_alloc() else {
            tokio::time::sleep(shared.config.busy_poll()).await;
            return LoopState::CapacityWait;
        };

        let Some(item) = shared.scheduler.poll() else {
            slot.release();
            return LoopState::IdlePoll;
        };

        shared.stats.record_dispatched();
        tracing::debug!("Dispatching {}", item.target());

        let task = Arc::clone(shared);
        tokio::spawn(async move {
            task.process(item).await;
            slot.release();
        });

        LoopState::Dispatch
    }
}

impl Shared {
    // In-flight is read before the queue. A task finishes all of its pushes
    // before releasing its slot, so once the count reads zero those pushes are
    // already visible in the queue.
    fn is_done(&self) -> bool {
        self.resources.count() == 0 && self.scheduler.count() == 0
    }

    fn enqueue(&self, mut item: WorkItem) {
        self.hooks.pre_enqueue(&mut item);
        tracing::trace!("Enqueued {}", item.target());
        self.scheduler.push(item);
        self.stats.record_enqueued();
    }

    async fn process(&self, mut item: WorkItem) {
        self.hooks.pre_fetch(&mut item);

        let mut result = match self.fetch(&item).await {
            Ok(result) => result,
            Err(e) => {
                self.stats.record_fetch_failed();
                tracing::warn!("Fetch failed for {}: {}", item.target(), e);
                self.retry(item);
                return;
            }
        };
        self.stats.record_fetch_succeeded();
        self.ledger.clear(&item.fingerprint());

        self.hooks.pre_process(&mut result);
        let mut out = Yield::new();
        self.processer.process(&result, &mut out);

        let (discovered, mut records) = out.into_parts();
        tracing::debug!(
            "Processed {}: {} new items, {} records",
            item.target(),
            discovered.len(),
            records.len()
        );
        for next in discovered {
            self.enqueue(next);
        }

        self.hooks.pre_sink(&mut records);
        self.forward(records).await;
    }

    async fn fetch(&self, item: &WorkItem) -> FetchOutcome {
        let download = self.downloader.fetch(item, &self.config);
        match self.config.fetch_timeout() {
            None => download.await,
            Some(limit) => match tokio::time::timeout(limit, download).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::Timeout {
                    url: item.target().to_string(),
                    after: limit,
                }),
            },
        }
    }

    fn retry(&self, item: WorkItem) {
        let fingerprint = item.fingerprint();
        match self
            .ledger
            .record_failure(fingerprint, self.config.max_retry_attempts)
        {
            RetryDecision::Retry { attempt } => {
                tracing::debug!(
                    "Re-enqueueing {} (failure {} of {} allowed)",
                    item.target(),
                    attempt,
                    self.config.max_retry_attempts
                );
                self.stats.record_retried();
                self.enqueue(item);
            }
            RetryDecision::GiveUp { attempts } => {
                tracing::info!(
                    "Giving up on {} after {} failed attempts",
                    item.target(),
                    attempts
                );
                self.stats.record_given_up();
            }
        }
    }

    async fn forward(&self, records: Vec<Record>) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };

        for record in records {
            for sink in rest {
                sink.forward(record.clone()).await;
                self.stats.record_forwarded();
            }
            last.forward(record).await;
            self.stats.record_forwarded();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::FetchResult;
    use async_trait::async_trait;

    struct EchoDownloader;

    #[async_trait]
    impl Downloader for EchoDownloader {
        async fn fetch(&self, item: &WorkItem, _config: &EngineConfig) -> FetchOutcome {
            Ok(FetchResult::new(item.clone(), item.target()))
        }
    }

    fn noop_processer(_: &FetchResult, _: &mut Yield) {}

    fn fast_config() -> EngineConfig {
        EngineConfig {
            concurrency_limit: 1,
            idle_wait_ms: 1,
            busy_poll_ms: 1,
            max_retry_attempts: 0,
            fetch_timeout_ms: None,
        }
    }

    #[test]
    fn test_build_requires_downloader_and_processer() {
        let missing_downloader = Engine::builder(fast_config())
            .processer(noop_processer)
            .build();
        assert!(matches!(missing_downloader, Err(SkeinError::Build(_))));

        let missing_processer = Engine::builder(fast_config())
            .downloader(EchoDownloader)
            .build();
        assert!(matches!(missing_processer, Err(SkeinError::Build(_))));
    }

    #[test]
    fn test_build_validates_config() {
        let config = EngineConfig {
            concurrency_limit: 0,
            ..fast_config()
        };
        let result = Engine::builder(config)
            .downloader(EchoDownloader)
            .processer(noop_processer)
            .build();
        assert!(matches!(result, Err(SkeinError::Config(_))));
    }

    #[tokio::test]
    async fn test_build_accepts_large_concurrency_limit() {
        let config = EngineConfig {
            concurrency_limit: 2000,
            ..fast_config()
        };
        let engine = Engine::builder(config)
            .downloader(EchoDownloader)
            .processer(noop_processer)
            .build()
            .unwrap();
        assert_eq!(engine.config().concurrency_limit, 2000);

        engine.seed_all(["https://a.test/", "https://b.test/"]);
        let stats = engine.run().await;
        assert_eq!(stats.fetch_succeeded, 2);
    }

    #[tokio::test]
    async fn test_tick_states() {
        let engine = Engine::builder(fast_config())
            .downloader(EchoDownloader)
            .processer(noop_processer)
            .build()
            .unwrap();

        assert_eq!(engine.tick().await, LoopState::Done);

        engine.seed("https://example.com/");
        assert_eq!(engine.pending(), 1);
        assert_eq!(engine.tick().await, LoopState::Dispatch);
        assert_eq!(engine.pending(), 0);

        let stats = engine.run().await;
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.fetch_succeeded, 1);
        assert!(engine.is_done());
    }

    #[tokio::test]
    async fn test_capacity_wait_when_slots_taken() {
        let engine = Engine::builder(fast_config())
            .downloader(EchoDownloader)
            .processer(noop_processer)
            .build()
            .unwrap();

        let held = engine.shared.resources.try_alloc().unwrap();
        engine.seed("https://example.com/");
        assert_eq!(engine.tick().await, LoopState::CapacityWait);
        assert_eq!(engine.pending(), 1);

        held.release();
        assert_eq!(engine.tick().await, LoopState::Dispatch);
        engine.run().await;
    }

    #[tokio::test]
    async fn test_idle_poll_while_in_flight() {
        let engine = Engine::builder(fast_config())
            .downloader(EchoDownloader)
            .processer(noop_processer)
            .build()
            .unwrap();

        let held = engine.shared.resources.try_alloc().unwrap();
        assert!(!engine.is_done());
        assert_eq!(engine.tick().await, LoopState::IdlePoll);

        held.release();
        assert_eq!(engine.tick().await, LoopState::Done);
    }
}
