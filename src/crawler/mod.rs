//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML query helpers shared by the extractors
//! - Frontier scheduling and deduplication
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
pub mod parser;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator, CrawlOptions};
pub use fetcher::{build_http_client, Fetcher, HttpFetcher, Page};
pub use scheduler::Scheduler;

use crate::item::Item;
use crate::spiders::Extractor;
use crate::url::Location;
use crate::HarvestError;
use futures::Stream;

/// Crawls breadth-first from `start`, yielding items as pages are extracted
///
/// This is the library entry point when the caller supplies its own fetcher
/// and extractor. The returned stream is lazy: no location is fetched until
/// it is polled.
///
/// # Arguments
///
/// * `fetcher` - Retrieves each page
/// * `extractor` - Turns each page into items and follow-up locations
/// * `start` - Initial frontier, in order
/// * `options` - Page budget and concurrency
///
/// # Returns
///
/// * `Ok(stream)` - Items in emission order
/// * `Err(HarvestError::NoStartLocations)` - `start` was empty
pub fn crawl(
    fetcher: impl Fetcher + 'static,
    extractor: impl Extractor + 'static,
    start: Vec<Location>,
    options: CrawlOptions,
) -> Result<impl Stream<Item = Item>, HarvestError> {
    Ok(Coordinator::new(fetcher, extractor, start, options)?.into_stream())
}
