//! Output module for crawl results
//!
//! This module handles:
//! - Persisting emitted items (JSON array file or JSON lines on stdout)
//! - Recording and printing crawl statistics

mod json;
pub mod stats;
mod traits;

pub use json::{ConsoleSink, JsonArraySink};
pub use stats::{print_statistics, CrawlStatistics, CrawlStats, FailedLocation};
pub use traits::{ItemSink, OutputError, OutputResult};

/// Builds the sink for an optional output path
///
/// A path selects the JSON array file; no path streams items to stdout.
pub fn sink_for(items_path: Option<&str>) -> Box<dyn ItemSink> {
    match items_path {
        Some(path) => Box::new(JsonArraySink::new(path)),
        None => Box::new(ConsoleSink::stdout()),
    }
}
