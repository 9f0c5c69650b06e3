//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `LocationState`: Tracks the state of individual locations (queued, fetching, visited, failed)

mod location_state;

pub use location_state::LocationState;
