use crate::item::Record;
use crate::output::traits::{format_record, Sink};
use async_trait::async_trait;
use std::io::Write;

/// Prints records to stdout
///
/// Each record is written under the stdout lock, so records from concurrent
/// tasks never interleave line by line.
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    separator: String,
}

impl ConsoleSink {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new("\t")
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn forward(&self, record: Record) {
        let text = format_record(&record, &self.separator);
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = stdout.write_all(text.as_bytes()) {
            tracing::warn!("Failed to write record to stdout: {}", e);
        }
    }
}
