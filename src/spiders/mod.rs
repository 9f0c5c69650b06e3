//! Built-in extractors
//!
//! Each spider is an [`Extractor`]: a pure function from a fetched page to
//! items and follow-up locations.
//!
//! - `page-outline`: links and headings of each start page
//! - `quotes`: quote listings, following pagination
//! - `quotes-with-authors`: quote listings plus author pages

mod outline;
mod quotes;
mod traits;

pub use outline::OutlineSpider;
pub use quotes::QuoteSpider;
pub use traits::{compile_selector, ExtractError, ExtractResult, Extraction, Extractor};

use crate::config::SpiderKind;

/// Builds the extractor for a configured spider kind
pub fn build_spider(kind: SpiderKind) -> ExtractResult<Box<dyn Extractor>> {
    let spider: Box<dyn Extractor> = match kind {
        SpiderKind::PageOutline => Box::new(OutlineSpider::new()?),
        SpiderKind::Quotes => Box::new(QuoteSpider::new()?),
        SpiderKind::QuotesWithAuthors => Box::new(QuoteSpider::with_authors()?),
    };
    Ok(spider)
}
