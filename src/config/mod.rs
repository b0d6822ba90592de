//! Configuration module for Skein
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The `[engine]` section maps onto `EngineConfig`, which can also be built in code.
//!
//! # Example
//!
//! ```no_run
//! use skein::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("skein.toml")).unwrap();
//! println!("Concurrency limit: {}", config.engine.concurrency_limit);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlConfig, EngineConfig, OutputConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate_engine_config;
