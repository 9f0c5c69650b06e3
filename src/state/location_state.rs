//! Location state definitions for tracking crawl progress
//!
//! A location that has never been seen has no state at all. Once discovered
//! it moves forward through these states and never goes back.

use std::fmt;

/// Represents the current state of a location in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationState {
    // ===== Active States =====
    /// Location is waiting in the frontier
    Queued,

    /// Location has been handed to the fetcher
    Fetching,

    // ===== Terminal States =====
    /// Location was fetched and handed to the extractor
    Visited,

    /// Location could not be fetched
    Failed,
}

impl LocationState {
    /// Returns true if moving from `self` to `next` keeps the state monotonic
    ///
    /// Allowed transitions:
    /// - Queued -> Fetching
    /// - Queued -> Visited (the location was reached through a redirect)
    /// - Fetching -> Visited | Failed
    pub fn can_transition_to(&self, next: LocationState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Queued, Self::Visited)
                | (Self::Fetching, Self::Visited)
                | (Self::Fetching, Self::Failed)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Visited => "visited",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
