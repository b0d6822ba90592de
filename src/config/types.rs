use crate::engine::QueueKind;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Skein
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Dispatch engine tunables
///
/// Read-only once an engine has been built from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of items processed at the same time
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: usize,

    /// Pause at the top of every dispatch loop tick (milliseconds)
    #[serde(rename = "idle-wait-ms")]
    pub idle_wait_ms: u64,

    /// Extra pause when work is pending but no slot is free (milliseconds)
    #[serde(rename = "busy-poll-ms")]
    pub busy_poll_ms: u64,

    /// Number of re-enqueues a failing item gets before it is dropped
    #[serde(rename = "max-retry-attempts")]
    pub max_retry_attempts: u32,

    /// Upper bound on a single downloader call (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 4,
            idle_wait_ms: 100,
            busy_poll_ms: 50,
            max_retry_attempts: 3,
            fetch_timeout_ms: Some(30_000),
        }
    }
}

impl EngineConfig {
    pub fn idle_wait(&self) -> Duration {
        Duration::from_millis(self.idle_wait_ms)
    }

    pub fn busy_poll(&self) -> Duration {
        Duration::from_millis(self.busy_poll_ms)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// What to crawl and how far to follow links
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Seed URLs enqueued before the engine starts
    pub seeds: Vec<String>,

    /// Maximum number of link hops followed from a seed
    #[serde(rename = "max-depth", default)]
    pub max_depth: u32,

    /// Pending-work queue ordering
    #[serde(default)]
    pub queue: QueueKind,

    /// Only follow links that stay on the host of the page they were found on
    #[serde(rename = "same-host", default)]
    pub same_host: bool,
}

/// Sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Print records to stdout
    #[serde(default = "default_console")]
    pub console: bool,

    /// Separator between key and value in printed records
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Append records to this file as well
    #[serde(rename = "file-path", default)]
    pub file_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            console: default_console(),
            separator: default_separator(),
            file_path: None,
        }
    }
}

fn default_console() -> bool {
    true
}

fn default_separator() -> String {
    "\t".to_string()
}
