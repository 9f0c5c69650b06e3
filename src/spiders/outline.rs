//! One-shot page outline
//!
//! Lists every link and every `h1`-`h3` heading of a page. Nothing is
//! followed, so a crawl with this spider fetches its start pages only.

use crate::crawler::parser::element_text;
use crate::crawler::Page;
use crate::item::Item;
use crate::spiders::traits::{compile_selector, ExtractResult, Extraction, Extractor};
use scraper::{Html, Selector};

pub struct OutlineSpider {
    links: Selector,
    headings: Selector,
}

impl OutlineSpider {
    pub fn new() -> ExtractResult<Self> {
        Ok(Self {
            links: compile_selector("a[href]")?,
            headings: compile_selector("h1, h2, h3")?,
        })
    }
}

impl Extractor for OutlineSpider {
    fn name(&self) -> &str {
        "page-outline"
    }

    /// Link items (`href`, `text`) come first, then heading items
    /// (`heading`, `text`), each group in document order. Links with an
    /// empty href or no visible text are skipped; hrefs are kept as written.
    fn extract(&self, page: &Page) -> ExtractResult<Extraction> {
        let document = Html::parse_document(&page.body);
        let mut items = Vec::new();

        for link in document.select(&self.links) {
            let href = link.value().attr("href").unwrap_or_default().trim();
            let text = element_text(link);
            if href.is_empty() || text.is_empty() {
                continue;
            }
            items.push(Item::new().with("href", href).with("text", text));
        }

        for heading in document.select(&self.headings) {
            items.push(
                Item::new()
                    .with("heading", heading.value().name())
                    .with("text", element_text(heading)),
            );
        }

        tracing::debug!("Outline of {}: {} entries", page.final_location, items.len());
        Ok(Extraction::new(items, Vec::new()))
    }
}
