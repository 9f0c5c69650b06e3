//! URL handling module for Sumi-Harvest
//!
//! Locations are the identity of everything the crawler fetches. This module
//! owns parsing, validation and link resolution for them.

mod location;

pub use location::Location;
