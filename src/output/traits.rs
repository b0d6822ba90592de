//! Sink trait and record formatting

use crate::item::Record;
use async_trait::async_trait;

/// Destination for extracted records
///
/// The engine forwards every record to every registered sink exactly once, in
/// sink registration order. Records from different worker tasks may arrive
/// interleaved, so implementations must be internally synchronized. A sink that
/// can fail handles its own errors; the engine does not observe them.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn forward(&self, record: Record);
}

/// Formats a record as one `key<separator>value` line per field
pub fn format_record(record: &Record, separator: &str) -> String {
    let mut out = String::new();
    for (key, value) in record.iter() {
        out.push_str(key);
        out.push_str(separator);
        out.push_str(value);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        let record = Record::new().with("title", "Home").with("url", "https://example.com/");
        assert_eq!(
            format_record(&record, "\t"),
            "title\tHome\nurl\thttps://example.com/\n"
        );
    }

    #[test]
    fn test_format_empty_record() {
        assert_eq!(format_record(&Record::new(), ": "), "");
    }
}
