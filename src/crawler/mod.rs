//! Collaborators driven by the dispatch engine
//!
//! This module contains the two contracts the engine calls for every item,
//! together with their default implementations:
//! - `Downloader` / `HttpDownloader`: fetching a work item over HTTP
//! - `Processer` / `LinkProcesser`: turning a page into records and new work

mod fetcher;
mod parser;

pub use fetcher::{build_http_client, Downloader, HttpDownloader};
pub use parser::{parse_html, LinkProcesser, ParsedPage, Processer};
