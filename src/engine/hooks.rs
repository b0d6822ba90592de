//! Hook registry
//!
//! Plugins run synchronously at four fixed stages of the per-item pipeline:
//!
//! | Stage        | Fires                                         | Argument            |
//! |--------------|-----------------------------------------------|---------------------|
//! | `PreEnqueue` | before every push (seed, discovery, retry)    | `&mut WorkItem`     |
//! | `PreFetch`   | before the item is handed to the downloader   | `&mut WorkItem`     |
//! | `PreProcess` | before the result is handed to the processer  | `&mut FetchResult`  |
//! | `PreSink`    | once per processed item, before the sinks     | `&mut Vec<Record>`  |
//!
//! Plugins for a stage run in registration order. They may mutate their argument
//! in place but cannot fail or stop the pipeline.

use crate::item::{FetchResult, Record, WorkItem};
use std::fmt;
use std::sync::Arc;

/// The four points in the pipeline where plugins run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PreEnqueue,
    PreFetch,
    PreProcess,
    PreSink,
}

/// A plugin that observes or rewrites a work item
pub trait WorkItemHook: Send + Sync {
    fn execute(&self, item: &mut WorkItem);
}

/// A plugin that observes or rewrites a fetch result
pub trait FetchResultHook: Send + Sync {
    fn execute(&self, result: &mut FetchResult);
}

/// A plugin that observes or rewrites the records bound for the sinks
pub trait RecordsHook: Send + Sync {
    fn execute(&self, records: &mut Vec<Record>);
}

impl<F> WorkItemHook for F
where
    F: Fn(&mut WorkItem) + Send + Sync,
{
    fn execute(&self, item: &mut WorkItem) {
        self(item)
    }
}

impl<F> FetchResultHook for F
where
    F: Fn(&mut FetchResult) + Send + Sync,
{
    fn execute(&self, result: &mut FetchResult) {
        self(result)
    }
}

impl<F> RecordsHook for F
where
    F: Fn(&mut Vec<Record>) + Send + Sync,
{
    fn execute(&self, records: &mut Vec<Record>) {
        self(records)
    }
}

/// A plugin bound to the stage it runs at
#[derive(Clone)]
pub enum Plugin {
    PreEnqueue(Arc<dyn WorkItemHook>),
    PreFetch(Arc<dyn WorkItemHook>),
    PreProcess(Arc<dyn FetchResultHook>),
    PreSink(Arc<dyn RecordsHook>),
}

impl Plugin {
    pub fn pre_enqueue(hook: impl WorkItemHook + 'static) -> Self {
        Plugin::PreEnqueue(Arc::new(hook))
    }

    pub fn pre_fetch(hook: impl WorkItemHook + 'static) -> Self {
        Plugin::PreFetch(Arc::new(hook))
    }

    pub fn pre_process(hook: impl FetchResultHook + 'static) -> Self {
        Plugin::PreProcess(Arc::new(hook))
    }

    pub fn pre_sink(hook: impl RecordsHook + 'static) -> Self {
        Plugin::PreSink(Arc::new(hook))
    }

    /// The stage this plugin runs at
    pub fn stage(&self) -> Stage {
        match self {
            Plugin::PreEnqueue(_) => Stage::PreEnqueue,
            Plugin::PreFetch(_) => Stage::PreFetch,
            Plugin::PreProcess(_) => Stage::PreProcess,
            Plugin::PreSink(_) => Stage::PreSink,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Plugin").field(&self.stage()).finish()
    }
}

/// Ordered per-stage plugin lists
#[derive(Clone, Default)]
pub struct HookRegistry {
    pre_enqueue: Vec<Arc<dyn WorkItemHook>>,
    pre_fetch: Vec<Arc<dyn WorkItemHook>>,
    pre_process: Vec<Arc<dyn FetchResultHook>>,
    pre_sink: Vec<Arc<dyn RecordsHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin to its stage's list
    pub fn register(&mut self, plugin: Plugin) {
        match plugin {
            Plugin::PreEnqueue(hook) => self.pre_enqueue.push(hook),
            Plugin::PreFetch(hook) => self.pre_fetch.push(hook),
            Plugin::PreProcess(hook) => self.pre_process.push(hook),
            Plugin::PreSink(hook) => self.pre_sink.push(hook),
        }
    }

    /// Number of plugins registered for a stage
    pub fn len(&self, stage: Stage) -> usize {
        match stage {
            Stage::PreEnqueue => self.pre_enqueue.len(),
            Stage::PreFetch => self.pre_fetch.len(),
            Stage::PreProcess => self.pre_process.len(),
            Stage::PreSink => self.pre_sink.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre_enqueue.is_empty()
            && self.pre_fetch.is_empty()
            && self.pre_process.is_empty()
            && self.pre_sink.is_empty()
    }

    pub fn pre_enqueue(&self, item: &mut WorkItem) {
        for hook in &self.pre_enqueue {
            hook.execute(item);
        }
    }

    pub fn pre_fetch(&self, item: &mut WorkItem) {
        for hook in &self.pre_fetch {
            hook.execute(item);
        }
    }

    pub fn pre_process(&self, result: &mut FetchResult) {
        for hook in &self.pre_process {
            hook.execute(result);
        }
    }

    pub fn pre_sink(&self, records: &mut Vec<Record>) {
        for hook in &self.pre_sink {
            hook.execute(records);
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("pre_enqueue", &self.pre_enqueue.len())
            .field("pre_fetch", &self.pre_fetch.len())
            .field("pre_process", &self.pre_process.len())
            .field("pre_sink", &self.pre_sink.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_plugins_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            registry.register(Plugin::pre_fetch(move |_: &mut WorkItem| {
                calls.lock().unwrap().push(name);
            }));
        }

        registry.pre_fetch(&mut WorkItem::new("https://example.com/"));
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_dispatch_is_by_stage() {
        let mut registry = HookRegistry::new();
        registry.register(Plugin::pre_enqueue(|item: &mut WorkItem| {
            item.set_header("X-Stage", "enqueue");
        }));
        registry.register(Plugin::pre_fetch(|item: &mut WorkItem| {
            item.set_header("X-Stage", "fetch");
        }));

        let mut item = WorkItem::new("https://example.com/");
        registry.pre_enqueue(&mut item);
        assert_eq!(item.headers.get("X-Stage").map(String::as_str), Some("enqueue"));

        assert_eq!(registry.len(Stage::PreEnqueue), 1);
        assert_eq!(registry.len(Stage::PreFetch), 1);
        assert_eq!(registry.len(Stage::PreSink), 0);
    }

    #[test]
    fn test_hooks_mutate_in_place() {
        let mut registry = HookRegistry::new();
        registry.register(Plugin::pre_process(|result: &mut FetchResult| {
            result.body = result.body.to_uppercase();
        }));
        registry.register(Plugin::pre_sink(|records: &mut Vec<Record>| {
            for record in records.iter_mut() {
                record.set("seen", "yes");
            }
        }));

        let mut result = FetchResult::new(WorkItem::new("https://example.com/"), "abc");
        registry.pre_process(&mut result);
        assert_eq!(result.body, "ABC");

        let mut records = vec![Record::new(), Record::new()];
        registry.pre_sink(&mut records);
        assert!(records.iter().all(|r| r.get("seen") == Some("yes")));
    }

    #[test]
    fn test_plugin_reports_stage() {
        let plugin = Plugin::pre_sink(|_: &mut Vec<Record>| {});
        assert_eq!(plugin.stage(), Stage::PreSink);
        assert!(HookRegistry::new().is_empty());
    }
}
