//! Skein: a bounded-concurrency crawl engine
//!
//! This crate implements a dispatch engine that repeatedly downloads, processes and
//! forwards structured records for a set of fetch targets, bounding how many items
//! are in flight and exposing typed hooks at fixed stages of the per-item pipeline.

pub mod config;
pub mod crawler;
pub mod engine;
pub mod item;
pub mod output;
pub mod plugins;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Skein operations
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine build error: {0}")]
    Build(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors a downloader reports for a single fetch attempt
///
/// Every variant is recoverable from the engine's point of view: it is handed to
/// the retry policy and never escapes the per-item task.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Fetch of {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Invalid fetch target {url}: {message}")]
    InvalidTarget { url: String, message: String },
}

/// Result type alias for Skein operations
pub type Result<T> = std::result::Result<T, SkeinError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Outcome of one downloader call
pub type FetchOutcome = std::result::Result<item::FetchResult, FetchError>;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use crawler::{Downloader, HttpDownloader, LinkProcesser, Processer};
pub use engine::{Engine, EngineBuilder, EngineStatsSnapshot, Stage};
pub use item::{Fingerprint, FetchResult, Record, WorkItem, Yield};
pub use output::Sink;
