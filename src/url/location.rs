use crate::{UrlError, UrlResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Identifier of a fetchable resource
///
/// A `Location` is an absolute HTTP(S) URL with its fragment removed.
/// Two locations are the same resource exactly when their serialized forms
/// are equal; no trailing-slash or query-order normalization is applied.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::Location;
///
/// let a = Location::parse("https://QUOTES.toscrape.com/page/2/#top").unwrap();
/// let b = Location::parse("https://quotes.toscrape.com/page/2/").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location(Url);

impl Location {
    /// Parses an absolute URL string into a location
    ///
    /// # Returns
    ///
    /// * `Ok(Location)` - The parsed location
    /// * `Err(UrlError)` - The input is malformed, not HTTP(S), or has no host
    pub fn parse(input: &str) -> UrlResult<Self> {
        let url = Url::parse(input.trim())?;
        Self::from_url(url)
    }

    /// Wraps an already parsed URL, validating scheme and host
    pub fn from_url(mut url: Url) -> UrlResult<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(UrlError::MissingHost(url.to_string()));
        }

        url.set_fragment(None);
        Ok(Self(url))
    }

    /// Resolves an href found on this location's page
    ///
    /// Returns None if the link should not be followed:
    /// - empty hrefs and fragment-only anchors
    /// - `javascript:`, `mailto:`, `tel:` and `data:` links
    /// - hrefs that do not resolve to an HTTP(S) URL
    pub fn join(&self, href: &str) -> Option<Location> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let lowered = href.to_ascii_lowercase();
        if lowered.starts_with("javascript:")
            || lowered.starts_with("mailto:")
            || lowered.starts_with("tel:")
            || lowered.starts_with("data:")
        {
            return None;
        }

        self.0
            .join(href)
            .ok()
            .and_then(|url| Location::from_url(url).ok())
    }

    /// The serialized form used for identity
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The underlying URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for Location {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Url> for Location {
    type Error = UrlError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        Self::from_url(url)
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
