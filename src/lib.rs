//! Sumi-Harvest: a small link-following scraper
//!
//! This crate fetches pages starting from a set of locations, extracts
//! structured items from each page, follows pagination and secondary links
//! breadth-first, and never fetches the same location twice.

pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod spiders;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Extraction error: {0}")]
    Extract(#[from] spiders::ExtractError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("A crawl needs at least one start location")]
    NoStartLocations,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(#[from] ::url::ParseError),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Failure to retrieve one location
///
/// Every variant carries the location that failed so the coordinator can
/// report it and carry on with the rest of the frontier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {location}: {source}")]
    Http {
        location: crate::url::Location,
        source: reqwest::Error,
    },

    #[error("Request timeout for {location}")]
    Timeout { location: crate::url::Location },

    #[error("HTTP {status} for {location}")]
    Status { location: crate::url::Location, status: u16 },

    #[error("Expected HTML from {location}, got {content_type}")]
    ContentMismatch {
        location: crate::url::Location,
        content_type: String,
    },
}

impl FetchError {
    /// The location whose fetch failed
    pub fn location(&self) -> &crate::url::Location {
        match self {
            Self::Http { location, .. }
            | Self::Timeout { location }
            | Self::Status { location, .. }
            | Self::ContentMismatch { location, .. } => location,
        }
    }
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlOptions, Fetcher, HttpFetcher, Page};
pub use item::{FieldValue, Item};
pub use state::LocationState;
pub use crate::url::Location;
