//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Recording the final location after redirects
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::url::Location;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// A fetched page
///
/// Pages are never modified once the fetcher hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The location that was requested
    pub location: Location,

    /// Location after following redirects
    pub final_location: Location,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, if present
    pub content_type: Option<String>,

    /// Page body content
    pub body: String,
}

impl Page {
    /// Builds a page that was served directly, without redirects
    pub fn new(location: Location, body: impl Into<String>) -> Self {
        Self {
            final_location: location.clone(),
            location,
            status_code: 200,
            content_type: Some("text/html".to_string()),
            body: body.into(),
        }
    }

    /// Returns true if the fetch ended somewhere other than where it started
    pub fn was_redirected(&self) -> bool {
        self.location != self.final_location
    }
}

/// Retrieves pages for the coordinator
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches one location
    ///
    /// Implementations report every failure, including non-success status
    /// codes, as a `FetchError` carrying the location.
    async fn fetch(&self, location: &Location) -> Result<Page, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from the user agent and crawler settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.crawler.request_timeout);
        let client = build_http_client(&config.user_agent, timeout)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a location with a GET request
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with HTML or no Content-Type | `Ok(Page)` |
    /// | 2xx with another Content-Type | `ContentMismatch` |
    /// | Non-2xx status | `Status` |
    /// | Timeout | `Timeout` |
    /// | Connection, TLS, redirect or body error | `Http` |
    async fn fetch(&self, location: &Location) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(location.as_url().clone())
            .send()
            .await
            .map_err(|e| classify_error(location, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                location: location.clone(),
                status: status.as_u16(),
            });
        }

        let final_location =
            Location::from_url(response.url().clone()).unwrap_or_else(|_| location.clone());

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(content_type) = &content_type {
            if !is_html(content_type) {
                return Err(FetchError::ContentMismatch {
                    location: location.clone(),
                    content_type: content_type.clone(),
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(location, e))?;

        tracing::debug!(
            "Fetched {} ({} bytes, status {})",
            final_location,
            body.len(),
            status.as_u16()
        );

        Ok(Page {
            location: location.clone(),
            final_location,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_error(location: &Location, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            location: location.clone(),
        }
    } else {
        FetchError::Http {
            location: location.clone(),
            source: error,
        }
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}
