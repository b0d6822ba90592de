//! Data model for the dispatch engine
//!
//! This module defines the values that flow through the per-item pipeline:
//! - `WorkItem`: a fetch target plus its transport context
//! - `FetchResult`: the decoded body handed from the downloader to the processer
//! - `Record`: one extracted unit of key/value data forwarded to sinks
//! - `Yield`: the task-local accumulator a processer fills

mod fetch_result;
mod record;
mod work_item;
mod yields;

pub use fetch_result::FetchResult;
pub use record::Record;
pub use work_item::{Fingerprint, WorkItem};
pub use yields::Yield;
