//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Dispatching locations from the frontier to the fetcher
//! - Handing fetched pages to the extractor
//! - Enqueuing discovered locations
//! - Emitting items as a lazy stream
//! - Cancellation and the page budget

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{Fetcher, HttpFetcher, Page};
use crate::crawler::scheduler::Scheduler;
use crate::item::Item;
use crate::output::{self, CrawlStatistics, CrawlStats, ItemSink};
use crate::spiders::{build_spider, Extractor};
use crate::state::LocationState;
use crate::url::Location;
use crate::{FetchError, HarvestError};
use futures::future::BoxFuture;
use futures::stream::{self, FuturesUnordered, Stream, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type FetchOutcome = Result<Page, FetchError>;

/// How a crawl is scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Stop dispatching after this many fetches
    pub max_pages: Option<usize>,

    /// Maximum fetches in flight; 1 means strictly sequential
    pub concurrency: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            concurrency: 1,
        }
    }
}

impl From<&CrawlerConfig> for CrawlOptions {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages.map(|n| n as usize),
            concurrency: config.max_concurrent_fetches as usize,
        }
    }
}

/// Main crawler coordinator structure
///
/// The coordinator is the only owner of the frontier and the location
/// states. Fetches run concurrently, but every pop, dedup check and state
/// change happens here, one location at a time.
pub struct Coordinator {
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    scheduler: Scheduler,
    in_flight: FuturesUnordered<BoxFuture<'static, FetchOutcome>>,
    concurrency: usize,
    stats: Arc<CrawlStats>,
    cancel: CancellationToken,
    completed: usize,
    finished: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Retrieves pages
    /// * `extractor` - Turns pages into items and links
    /// * `start` - Locations the frontier is seeded with
    /// * `options` - Page budget and concurrency
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl; nothing has been fetched yet
    /// * `Err(HarvestError::NoStartLocations)` - `start` was empty
    pub fn new(
        fetcher: impl Fetcher + 'static,
        extractor: impl Extractor + 'static,
        start: Vec<Location>,
        options: CrawlOptions,
    ) -> Result<Self, HarvestError> {
        if start.is_empty() {
            return Err(HarvestError::NoStartLocations);
        }

        tracing::info!(
            "Seeding frontier with {} start locations for spider '{}'",
            start.len(),
            extractor.name()
        );

        Ok(Self {
            fetcher: Arc::new(fetcher),
            extractor: Box::new(extractor),
            scheduler: Scheduler::new(start, options.max_pages),
            in_flight: FuturesUnordered::new(),
            concurrency: options.concurrency.max(1),
            stats: Arc::new(CrawlStats::new()),
            cancel: CancellationToken::new(),
            completed: 0,
            finished: false,
        })
    }

    /// Shared handle to the crawl counters
    pub fn stats(&self) -> Arc<CrawlStats> {
        Arc::clone(&self.stats)
    }

    /// Token that stops the crawl between fetches when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn frontier_size(&self) -> usize {
        self.scheduler.frontier_size()
    }

    pub fn state_of(&self, location: &Location) -> Option<LocationState> {
        self.scheduler.state_of(location)
    }

    /// Turns the coordinator into a lazy stream of items
    ///
    /// Nothing is fetched until the stream is polled. Items of one page are
    /// yielded together and in extraction order.
    pub fn into_stream(self) -> impl Stream<Item = Item> {
        stream::unfold(self, |mut coordinator| async move {
            let batch = coordinator.next_batch().await?;
            Some((stream::iter(batch), coordinator))
        })
        .flatten()
    }

    /// Advances the crawl by one completed fetch
    ///
    /// Tops up the in-flight fetches from the frontier, waits for the next
    /// one to finish and returns the items it produced (possibly none).
    /// Returns None once nothing is in flight and nothing more may be
    /// dispatched.
    pub async fn next_batch(&mut self) -> Option<Vec<Item>> {
        if self.finished {
            return None;
        }

        self.dispatch();

        match self.in_flight.next().await {
            Some(result) => Some(self.complete(result)),
            None => {
                self.finish();
                None
            }
        }
    }

    /// Hands queued locations to the fetcher until the concurrency limit
    fn dispatch(&mut self) {
        while self.in_flight.len() < self.concurrency {
            if self.cancel.is_cancelled() {
                break;
            }

            let Some(location) = self.scheduler.next_location() else {
                break;
            };

            tracing::debug!("Fetching {}", location);
            let fetcher = Arc::clone(&self.fetcher);
            self.in_flight
                .push(Box::pin(async move { fetcher.fetch(&location).await }));
        }
    }

    /// Processes one finished fetch
    fn complete(&mut self, result: FetchOutcome) -> Vec<Item> {
        self.completed += 1;
        if self.completed % 10 == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier",
                self.completed,
                self.scheduler.frontier_size()
            );
        }

        let location = match &result {
            Ok(page) => &page.location,
            Err(error) => error.location(),
        };
        if self.scheduler.take_superseded(location) {
            tracing::debug!("Dropping fetch of {}, already reached by a redirect", location);
            return Vec::new();
        }

        match result {
            Ok(page) => self.process_page(page),
            Err(error) => {
                tracing::warn!("Failed to fetch {}", error);
                self.scheduler.mark_failed(error.location());
                self.stats.page_failed(error.location(), error.to_string());
                Vec::new()
            }
        }
    }

    fn process_page(&mut self, page: Page) -> Vec<Item> {
        self.scheduler.mark_visited(&page.location);
        self.stats.page_fetched();

        if page.was_redirected() {
            tracing::debug!("{} redirected to {}", page.location, page.final_location);
            if !self.scheduler.mark_redirect_target(&page.final_location) {
                tracing::debug!("Content of {} was already extracted", page.final_location);
                return Vec::new();
            }
        }

        match self.extractor.extract(&page) {
            Ok(extraction) => {
                tracing::debug!(
                    "Extracted {} items and {} links from {}",
                    extraction.items.len(),
                    extraction.links.len(),
                    page.location
                );
                self.enqueue_links(extraction.links);
                self.stats.items_emitted(extraction.items.len());
                extraction.items
            }
            Err(error) => {
                tracing::warn!("Skipping items from {}: {}", page.location, error);
                self.stats.extract_error();
                self.enqueue_links(error.into_recovered_links());
                Vec::new()
            }
        }
    }

    fn enqueue_links(&mut self, links: Vec<Location>) {
        for link in links {
            let is_new = self.scheduler.enqueue(link);
            self.stats.link_discovered(is_new);
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.stats.finish();

        let remaining = self.scheduler.frontier_size();
        if self.cancel.is_cancelled() {
            tracing::info!("Crawl cancelled, {} locations left in frontier", remaining);
        } else if self.scheduler.budget_exhausted() && remaining > 0 {
            tracing::info!(
                "Page budget of {} reached, {} locations left in frontier",
                self.scheduler.dispatched(),
                remaining
            );
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }

        tracing::info!(
            "Crawl finished: {} visited, {} failed",
            self.scheduler.visited_count(),
            self.scheduler.failed_count()
        );
    }
}

/// Runs a complete crawl described by a configuration
///
/// This function orchestrates the entire crawl process:
///
/// 1. Parse the start locations
/// 2. Build the HTTP fetcher and the configured spider
/// 3. Stream items into the configured sink
/// 4. Stop early on Ctrl-C, keeping what was already extracted
/// 5. Flush the sink and return the final statistics
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::load_config;
/// use sumi_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let stats = run_crawl(config).await?;
/// println!("{} items", stats.items_emitted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlStatistics, HarvestError> {
    let start = config
        .spider
        .start_urls
        .iter()
        .map(|url| Location::parse(url))
        .collect::<Result<Vec<_>, _>>()?;

    let fetcher = HttpFetcher::from_config(&config)?;
    let spider = build_spider(config.spider.kind)?;
    let coordinator = Coordinator::new(fetcher, spider, start, CrawlOptions::from(&config.crawler))?;

    let stats = coordinator.stats();
    let cancel = coordinator.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            cancel.cancel();
        }
    });

    let mut sink = output::sink_for(config.output.items_path.as_deref());
    let result = drain_into(coordinator.into_stream(), sink.as_mut()).await;
    interrupt.abort();

    // Whatever was accepted is saved even if a later write failed
    sink.finish()?;
    result?;

    Ok(stats.snapshot())
}

/// Feeds every item of a stream into a sink
async fn drain_into(
    items: impl Stream<Item = Item>,
    sink: &mut dyn ItemSink,
) -> Result<(), HarvestError> {
    futures::pin_mut!(items);
    while let Some(item) = items.next().await {
        sink.accept(&item)?;
    }
    Ok(())
}
