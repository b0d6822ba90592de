use crate::engine::{Plugin, RecordsHook};
use crate::item::Record;

/// Stamps a fixed field onto every record before it reaches the sinks
#[derive(Debug, Clone)]
pub struct RecordAnnotator {
    key: String,
    value: String,
}

impl RecordAnnotator {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Binds the annotator to the pre-sink stage
    pub fn into_plugin(self) -> Plugin {
        Plugin::pre_sink(self)
    }
}

impl RecordsHook for RecordAnnotator {
    fn execute(&self, records: &mut Vec<Record>) {
        for record in records.iter_mut() {
            record.set(self.key.as_str(), self.value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotates_every_record() {
        let annotator = RecordAnnotator::new("task", "news");
        let mut records = vec![Record::new().with("a", "1"), Record::new()];

        annotator.execute(&mut records);
        assert!(records.iter().all(|r| r.get("task") == Some("news")));
        assert_eq!(records[0].get("a"), Some("1"));
    }
}
