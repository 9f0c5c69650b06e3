//! Scheduler for managing the crawl frontier
//!
//! This module handles:
//! - FIFO queue management for locations to crawl
//! - Per-location state tracking (queued, fetching, visited, failed)
//! - Deduplication of rediscovered locations
//! - The optional page budget

use crate::state::LocationState;
use crate::url::Location;
use std::collections::{HashMap, HashSet, VecDeque};

/// Scheduler owns the frontier and every location's state
///
/// Every mutation happens through `&mut self`, so popping a location,
/// checking its state and marking it as fetching is one atomic step no
/// matter how many fetches are in flight.
#[derive(Debug)]
pub struct Scheduler {
    /// Locations waiting to be fetched, in discovery order
    frontier: VecDeque<Location>,

    /// State of every location seen so far; absent means unseen
    states: HashMap<Location, LocationState>,

    /// Maximum number of dispatched fetches
    max_pages: Option<usize>,

    /// In-flight fetches whose content already arrived through a redirect
    superseded: HashSet<Location>,

    /// Number of locations handed out so far
    dispatched: usize,

    queued: usize,
    fetching: usize,
    visited: usize,
    failed: usize,
}

impl Scheduler {
    /// Creates a new scheduler seeded with the start locations
    ///
    /// Duplicate start locations are queued once.
    pub fn new(start: impl IntoIterator<Item = Location>, max_pages: Option<usize>) -> Self {
        let mut scheduler = Self {
            frontier: VecDeque::new(),
            states: HashMap::new(),
            max_pages,
            superseded: HashSet::new(),
            dispatched: 0,
            queued: 0,
            fetching: 0,
            visited: 0,
            failed: 0,
        };

        for location in start {
            scheduler.enqueue(location);
        }

        scheduler
    }

    /// Adds a newly discovered location to the back of the frontier
    ///
    /// # Returns
    ///
    /// * `true` - The location was unseen and is now queued
    /// * `false` - The location was already queued, fetching, visited or failed
    pub fn enqueue(&mut self, location: Location) -> bool {
        if let Some(state) = self.states.get(&location) {
            tracing::trace!("Skipping {} ({})", location, state);
            return false;
        }

        self.states.insert(location.clone(), LocationState::Queued);
        self.queued += 1;
        self.frontier.push_back(location);
        true
    }

    /// Pops the next location to fetch and marks it as fetching
    ///
    /// Locations that stopped being `Queued` while waiting (for example
    /// because a redirect already reached them) are dropped. Returns None
    /// when the frontier is empty or the page budget is spent.
    pub fn next_location(&mut self) -> Option<Location> {
        if self.budget_exhausted() {
            return None;
        }

        while let Some(location) = self.frontier.pop_front() {
            if self.transition(&location, LocationState::Fetching) {
                self.dispatched += 1;
                return Some(location);
            }
            tracing::trace!("Dropping {} from frontier, already handled", location);
        }

        None
    }

    /// Records a successful fetch
    pub fn mark_visited(&mut self, location: &Location) {
        self.transition(location, LocationState::Visited);
    }

    /// Records a failed fetch
    pub fn mark_failed(&mut self, location: &Location) {
        self.transition(location, LocationState::Failed);
    }

    /// Records that a location's content was obtained through a redirect
    ///
    /// Unseen, queued and in-flight locations become visited. An in-flight
    /// fetch of the target is remembered so its own result can be dropped
    /// with [`Scheduler::take_superseded`].
    ///
    /// # Returns
    ///
    /// * `true` - The redirected content is new and should be extracted
    /// * `false` - The target was already visited; its content was extracted
    pub fn mark_redirect_target(&mut self, location: &Location) -> bool {
        match self.states.get(location).copied() {
            None => {
                self.states.insert(location.clone(), LocationState::Visited);
                self.visited += 1;
                true
            }
            Some(LocationState::Queued) => self.transition(location, LocationState::Visited),
            Some(LocationState::Fetching) => {
                self.transition(location, LocationState::Visited);
                self.superseded.insert(location.clone());
                true
            }
            Some(LocationState::Visited) => false,
            Some(LocationState::Failed) => true,
        }
    }

    /// Returns true if this finished fetch was superseded by a redirect
    ///
    /// The caller discards the result. Each superseded location is reported
    /// once.
    pub fn take_superseded(&mut self, location: &Location) -> bool {
        self.superseded.remove(location)
    }

    /// Current state of a location; None if it was never seen
    pub fn state_of(&self, location: &Location) -> Option<LocationState> {
        self.states.get(location).copied()
    }

    /// Returns the number of locations waiting in the frontier
    ///
    /// Entries made stale by redirects are not counted.
    pub fn frontier_size(&self) -> usize {
        self.queued
    }

    /// Number of locations whose content was obtained
    pub fn visited_count(&self) -> usize {
        self.visited
    }

    /// Number of locations whose fetch failed
    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Number of locations handed out for fetching
    pub fn dispatched(&self) -> usize {
        self.dispatched
    }

    /// True once `max_pages` locations have been dispatched
    pub fn budget_exhausted(&self) -> bool {
        self.max_pages
            .map_or(false, |limit| self.dispatched >= limit)
    }

    fn tally(&mut self, state: LocationState) -> &mut usize {
        match state {
            LocationState::Queued => &mut self.queued,
            LocationState::Fetching => &mut self.fetching,
            LocationState::Visited => &mut self.visited,
            LocationState::Failed => &mut self.failed,
        }
    }

    /// Moves a location forward; refuses anything that is not monotonic
    fn transition(&mut self, location: &Location, next: LocationState) -> bool {
        let Some(state) = self.states.get_mut(location) else {
            return false;
        };

        if !state.can_transition_to(next) {
            tracing::trace!("Ignoring {} -> {} for {}", state, next, location);
            return false;
        }

        let previous = std::mem::replace(state, next);
        *self.tally(previous) -= 1;
        *self.tally(next) += 1;
        true
    }
}
