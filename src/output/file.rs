use crate::item::Record;
use crate::output::traits::{format_record, Sink};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends records to a file
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    separator: String,
    file: Mutex<File>,
}

impl FileSink {
    /// Opens `path` for appending, creating it if needed
    pub async fn create(path: impl AsRef<Path>, separator: impl Into<String>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            separator: separator.into(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn forward(&self, record: Record) {
        let text = format_record(&record, &self.separator);
        let mut file = self.file.lock().await;

        let written: std::io::Result<()> = async {
            file.write_all(text.as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = written {
            tracing::warn!("Failed to write record to {}: {}", self.path.display(), e);
        }
    }
}
