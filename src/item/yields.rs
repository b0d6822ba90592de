use crate::item::{Record, WorkItem};

/// Task-local accumulator filled by one processing call
///
/// The engine creates a fresh `Yield` per processed item and drains it
/// completely before the item's task finishes.
#[derive(Debug, Default)]
pub struct Yield {
    work: Vec<WorkItem>,
    records: Vec<Record>,
}

impl Yield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a newly discovered work item
    pub fn push_work(&mut self, item: WorkItem) {
        self.work.push(item);
    }

    /// Adds an extracted record
    pub fn push_record(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Discovered work items, in the order they were added
    pub fn work(&self) -> &[WorkItem] {
        &self.work
    }

    /// Extracted records, in the order they were added
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes the yield, returning discovered work and records
    pub fn into_parts(self) -> (Vec<WorkItem>, Vec<Record>) {
        (self.work, self.records)
    }
}
