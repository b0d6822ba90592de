use crate::item::Record;
use crate::output::traits::Sink;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// Collects records in memory, in arrival order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Record>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything received so far
    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn forward(&self, record: Record) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.forward(Record::new().with("n", "1")).await;
        sink.forward(Record::new().with("n", "2")).await;

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("n"), Some("1"));
        assert_eq!(records[1].get("n"), Some("2"));
    }
}
