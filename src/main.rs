//! Skein main entry point
//!
//! This is the command-line interface for the Skein crawl engine.

use anyhow::Context;
use clap::Parser;
use skein::config::{load_config_with_hash, Config};
use skein::crawler::{HttpDownloader, LinkProcesser};
use skein::engine::{print_statistics, Engine};
use skein::output::{ConsoleSink, FileSink};
use skein::plugins::{ProxyRotator, RecordAnnotator, UserAgentPlugin};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Skein: a bounded-concurrency crawl engine
///
/// Skein fetches the seed URLs from its configuration, records every page it
/// downloads and follows links up to the configured depth.
#[derive(Parser, Debug)]
#[command(name = "skein")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Route fetches through these proxies, round-robin (repeatable)
    #[arg(long = "proxy", value_name = "URL")]
    proxies: Vec<String>,

    /// Add `task=<NAME>` to every record
    #[arg(long, value_name = "NAME")]
    task: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.proxies, cli.task).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skein=info,warn"),
            1 => EnvFilter::new("skein=debug,info"),
            2 => EnvFilter::new("skein=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Records go to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Skein Dry Run ===\n");

    println!("Engine:");
    println!("  Concurrency limit: {}", config.engine.concurrency_limit);
    println!("  Idle wait: {}ms", config.engine.idle_wait_ms);
    println!("  Busy poll: {}ms", config.engine.busy_poll_ms);
    println!("  Max retry attempts: {}", config.engine.max_retry_attempts);
    match config.engine.fetch_timeout_ms {
        Some(ms) => println!("  Fetch timeout: {}ms", ms),
        None => println!("  Fetch timeout: none"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nCrawl:");
    println!("  Queue: {:?}", config.crawl.queue);
    println!("  Max depth: {}", config.crawl.max_depth);
    println!("  Same host only: {}", config.crawl.same_host);
    println!("  Seeds ({}):", config.crawl.seeds.len());
    for seed in &config.crawl.seeds {
        println!("    * {}", seed);
    }

    println!("\nOutput:");
    println!("  Console: {}", config.output.console);
    if let Some(path) = &config.output.file_path {
        println!("  File: {}", path);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    proxies: Vec<String>,
    task: Option<String>,
) -> anyhow::Result<()> {
    let downloader = HttpDownloader::new(config.user_agent.clone())?;
    let processer = LinkProcesser::new(config.crawl.max_depth).same_host(config.crawl.same_host);

    let mut builder = Engine::builder(config.engine.clone())
        .boxed_scheduler(config.crawl.queue.build())
        .downloader(downloader)
        .processer(processer)
        .plugin(UserAgentPlugin::from_config(&config.user_agent).into_plugin());

    if !proxies.is_empty() {
        tracing::info!("Rotating across {} proxies", proxies.len());
        builder = builder.plugin(ProxyRotator::new(proxies).into_plugin());
    }
    if let Some(task) = task {
        builder = builder.plugin(RecordAnnotator::new("task", task).into_plugin());
    }
    if config.output.console {
        builder = builder.sink(ConsoleSink::new(config.output.separator.as_str()));
    }
    if let Some(path) = &config.output.file_path {
        let sink = FileSink::create(path, config.output.separator.as_str())
            .await
            .with_context(|| format!("failed to open {}", path))?;
        builder = builder.sink(sink);
    }

    let engine = builder.build()?;
    engine.seed_all(config.crawl.seeds.iter().map(String::as_str));
    tracing::info!("Total seed URLs: {}", config.crawl.seeds.len());

    let stats = engine.run().await;
    print_statistics(&stats);

    Ok(())
}
