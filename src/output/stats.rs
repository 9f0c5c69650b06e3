//! Crawl statistics
//!
//! Counters are shared between the coordinator and whoever consumes the
//! item stream, so they are atomics behind an `Arc`.

use crate::url::Location;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A location whose fetch failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLocation {
    pub location: Location,
    pub reason: String,
}

/// Live counters updated while a crawl runs
#[derive(Debug)]
pub struct CrawlStats {
    started_at: DateTime<Utc>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
    pages_fetched: AtomicU64,
    pages_failed: AtomicU64,
    items_emitted: AtomicU64,
    extract_errors: AtomicU64,
    links_discovered: AtomicU64,
    duplicate_links: AtomicU64,
    failures: Mutex<Vec<FailedLocation>>,
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: Mutex::new(None),
            pages_fetched: AtomicU64::new(0),
            pages_failed: AtomicU64::new(0),
            items_emitted: AtomicU64::new(0),
            extract_errors: AtomicU64::new(0),
            links_discovered: AtomicU64::new(0),
            duplicate_links: AtomicU64::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn page_fetched(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn items_emitted(&self, count: usize) {
        self.items_emitted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn extract_error(&self) {
        self.extract_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one candidate link and whether it was new
    pub fn link_discovered(&self, is_new: bool) {
        if is_new {
            self.links_discovered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.duplicate_links.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn page_failed(&self, location: &Location, reason: impl Into<String>) {
        self.pages_failed.fetch_add(1, Ordering::Relaxed);
        let mut failures = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        failures.push(FailedLocation {
            location: location.clone(),
            reason: reason.into(),
        });
    }

    pub fn finish(&self) {
        let mut finished = self.finished_at.lock().unwrap_or_else(|e| e.into_inner());
        finished.get_or_insert_with(Utc::now);
    }

    /// Copies the current counters
    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            started_at: self.started_at,
            finished_at: *self.finished_at.lock().unwrap_or_else(|e| e.into_inner()),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            pages_failed: self.pages_failed.load(Ordering::Relaxed),
            items_emitted: self.items_emitted.load(Ordering::Relaxed),
            extract_errors: self.extract_errors.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            duplicate_links: self.duplicate_links.load(Ordering::Relaxed),
            failures: self
                .failures
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Pages fetched successfully
    pub pages_fetched: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    pub items_emitted: u64,

    /// Pages whose extraction failed after a successful fetch
    pub extract_errors: u64,

    /// New locations added to the frontier
    pub links_discovered: u64,

    /// Candidate links that were already known
    pub duplicate_links: u64,

    pub failures: Vec<FailedLocation>,
}

impl CrawlStatistics {
    /// Total pages the crawler attempted
    pub fn pages_attempted(&self) -> u64 {
        self.pages_fetched + self.pages_failed
    }

    /// Calculates the fetch success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_attempted();
        if attempted == 0 {
            0.0
        } else {
            (self.pages_fetched as f64 / attempted as f64) * 100.0
        }
    }

    /// Wall-clock duration, once the crawl has finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Items emitted: {}", stats.items_emitted);
    println!(
        "  Links discovered: {} ({} duplicates skipped)",
        stats.links_discovered, stats.duplicate_links
    );
    if stats.extract_errors > 0 {
        println!("  Extraction errors: {}", stats.extract_errors);
    }
    println!();

    if !stats.failures.is_empty() {
        println!("Failed Locations ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!("  - {}: {}", failure.location, failure.reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        stats.success_rate(),
        stats.pages_fetched,
        stats.pages_attempted()
    );
}
