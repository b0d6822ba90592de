//! Output module: sinks that receive extracted records
//!
//! This module handles:
//! - The `Sink` trait the engine forwards records to
//! - Printing records to the console
//! - Appending records to a file
//! - Collecting records in memory

mod console;
mod file;
mod memory;
mod traits;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use memory::MemorySink;
pub use traits::{format_record, Sink};
