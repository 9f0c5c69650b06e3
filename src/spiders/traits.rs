//! Extractor trait and associated types
//!
//! An extractor turns one fetched page into items and follow-up locations.
//! It never performs I/O; the coordinator does the fetching.

use crate::crawler::Page;
use crate::item::Item;
use crate::url::Location;
use scraper::Selector;
use thiserror::Error;

/// Errors that can occur while extracting from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Missing field '{field}' on {location}")]
    MissingField {
        field: &'static str,
        location: Location,
        /// Links found before the failure; the crawl still follows them
        links: Vec<Location>,
    },
}

impl ExtractError {
    /// Takes the links that were recovered before the failure
    pub fn into_recovered_links(self) -> Vec<Location> {
        match self {
            Self::MissingField { links, .. } => links,
            Self::Selector { .. } => Vec::new(),
        }
    }
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// What one page produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Items in extraction order
    pub items: Vec<Item>,

    /// Candidate locations in discovery order
    pub links: Vec<Location>,
}

impl Extraction {
    pub fn new(items: Vec<Item>, links: Vec<Location>) -> Self {
        Self { items, links }
    }
}

/// Turns a page into items and follow-up locations
///
/// Implementations must be pure: the same page always gives the same
/// extraction.
pub trait Extractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Extracts items and links from one page
    fn extract(&self, page: &Page) -> ExtractResult<Extraction>;
}

impl<E: Extractor + ?Sized> Extractor for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract(&self, page: &Page) -> ExtractResult<Extraction> {
        (**self).extract(page)
    }
}

/// Compiles a CSS selector, mapping failures into `ExtractError`
pub fn compile_selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}
