use serde::Deserialize;
use std::fmt;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub spider: SpiderConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to fetch; unlimited when absent
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Maximum number of fetches in flight (1 = sequential)
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_concurrency() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON array file; items go to stdout when absent
    #[serde(rename = "items-path", default)]
    pub items_path: Option<String>,
}

/// Which extractor to run and where to start
#[derive(Debug, Clone, Deserialize)]
pub struct SpiderConfig {
    pub kind: SpiderKind,

    /// Locations the frontier is seeded with
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<String>,
}

/// Built-in extractors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpiderKind {
    /// Links and headings of each start page, no following
    PageOutline,
    /// Quotes, following pagination
    Quotes,
    /// Quotes and author pages, following pagination and author links
    QuotesWithAuthors,
}

impl fmt::Display for SpiderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PageOutline => "page-outline",
            Self::Quotes => "quotes",
            Self::QuotesWithAuthors => "quotes-with-authors",
        };
        f.write_str(name)
    }
}
