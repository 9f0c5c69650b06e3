//! Quote listing spider
//!
//! Reads quote listings laid out like quotes.toscrape.com: one
//! `div.quote` per quote, pagination under `li.next`, and an "(about)" link
//! to the author's page next to each author name.

use crate::crawler::parser::{all_text, element_text, first_attr, first_text};
use crate::crawler::Page;
use crate::item::Item;
use crate::spiders::traits::{
    compile_selector, ExtractError, ExtractResult, Extraction, Extractor,
};
use scraper::{Html, Selector};

struct QuoteSelectors {
    quote: Selector,
    text: Selector,
    author: Selector,
    tag: Selector,
    author_link: Selector,
    next_page: Selector,
    author_title: Selector,
    born_date: Selector,
    born_location: Selector,
    description: Selector,
}

impl QuoteSelectors {
    fn compile() -> ExtractResult<Self> {
        Ok(Self {
            quote: compile_selector("div.quote")?,
            text: compile_selector("span.text")?,
            author: compile_selector("small.author")?,
            tag: compile_selector("a.tag")?,
            author_link: compile_selector("small.author + a[href]")?,
            next_page: compile_selector("li.next a[href]")?,
            author_title: compile_selector("h3.author-title")?,
            born_date: compile_selector("span.author-born-date")?,
            born_location: compile_selector("span.author-born-location")?,
            description: compile_selector("div.author-description")?,
        })
    }
}

/// Extracts quotes and follows pagination, optionally visiting author pages
///
/// Quote items have the fields `text`, `author` and `tags`. With author
/// following enabled, author pages produce items with `name`, `birth_date`,
/// `birth_location` and `description`.
pub struct QuoteSpider {
    follow_authors: bool,
    selectors: QuoteSelectors,
}

impl QuoteSpider {
    /// Quotes only, following pagination
    pub fn new() -> ExtractResult<Self> {
        Ok(Self {
            follow_authors: false,
            selectors: QuoteSelectors::compile()?,
        })
    }

    /// Quotes plus author pages
    pub fn with_authors() -> ExtractResult<Self> {
        Ok(Self {
            follow_authors: true,
            selectors: QuoteSelectors::compile()?,
        })
    }

    fn extract_listing(&self, document: &Html, page: &Page) -> ExtractResult<Extraction> {
        let s = &self.selectors;
        let base = &page.final_location;
        let root = document.root_element();

        // Links first, so a malformed quote does not lose them
        let mut links = Vec::new();
        if self.follow_authors {
            for quote in document.select(&s.quote) {
                if let Some(author) = first_attr(quote, &s.author_link, "href")
                    .and_then(|href| base.join(&href))
                {
                    links.push(author);
                }
            }
        }
        if let Some(next) = first_attr(root, &s.next_page, "href").and_then(|href| base.join(&href))
        {
            links.push(next);
        }

        let mut items = Vec::new();
        for quote in document.select(&s.quote) {
            let Some(text) = first_text(quote, &s.text) else {
                return Err(ExtractError::MissingField {
                    field: "text",
                    location: page.location.clone(),
                    links,
                });
            };

            items.push(
                Item::new()
                    .with("text", text)
                    .with("author", first_text(quote, &s.author))
                    .with("tags", all_text(quote, &s.tag)),
            );
        }

        Ok(Extraction::new(items, links))
    }

    fn extract_author(&self, document: &Html, page: &Page) -> ExtractResult<Extraction> {
        let s = &self.selectors;
        let root = document.root_element();

        let description = root
            .select(&s.description)
            .next()
            .map(element_text)
            .ok_or_else(|| ExtractError::MissingField {
                field: "description",
                location: page.location.clone(),
                links: Vec::new(),
            })?;

        let item = Item::new()
            .with("name", first_text(root, &s.author_title))
            .with("birth_date", first_text(root, &s.born_date))
            .with("birth_location", first_text(root, &s.born_location))
            .with("description", description);

        Ok(Extraction::new(vec![item], Vec::new()))
    }

    fn is_author_page(&self, document: &Html) -> bool {
        document.select(&self.selectors.author_title).next().is_some()
    }
}

impl Extractor for QuoteSpider {
    fn name(&self) -> &str {
        if self.follow_authors {
            "quotes-with-authors"
        } else {
            "quotes"
        }
    }

    fn extract(&self, page: &Page) -> ExtractResult<Extraction> {
        let document = Html::parse_document(&page.body);

        if self.follow_authors && self.is_author_page(&document) {
            self.extract_author(&document, page)
        } else {
            self.extract_listing(&document, page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::FieldValue;
    use crate::url::Location;

    const LISTING: &str = r#"
        <html><body>
        <div class="quote">
            <span class="text">“The world as we have created it is a process of our thinking.”</span>
            <span>by <small class="author">Albert Einstein</small>
            <a href="/author/Albert-Einstein">(about)</a></span>
            <div class="tags">
                <a class="tag" href="/tag/change/">change</a>
                <a class="tag" href="/tag/thinking/">thinking</a>
            </div>
        </div>
        <div class="quote">
            <span class="text">“It is our choices, Harry...”</span>
            <span>by <small class="author">J.K. Rowling</small>
            <a href="/author/J-K-Rowling">(about)</a></span>
        </div>
        <ul class="pager"><li class="next"><a href="/page/2/">Next →</a></li></ul>
        </body></html>
    "#;

    const AUTHOR: &str = r#"
        <html><body><div class="author-details">
            <h3 class="author-title">Albert Einstein
            </h3>
            <p><strong>Born:</strong> <span class="author-born-date">March 14, 1879</span>
            <span class="author-born-location">in Ulm, Germany</span></p>
            <div class="author-description">
                In 1879, Albert Einstein was born in Ulm, Germany.
            </div>
        </div></body></html>
    "#;

    fn page(path: &str, body: &str) -> Page {
        Page::new(
            Location::parse(&format!("https://quotes.toscrape.com{}", path)).unwrap(),
            body,
        )
    }

    fn text<'a>(item: &'a Item, field: &str) -> Option<&'a str> {
        item.get(field).and_then(FieldValue::as_text)
    }

    #[test]
    fn test_quotes_and_pagination() {
        let spider = QuoteSpider::new().unwrap();
        let extraction = spider.extract(&page("/", LISTING)).unwrap();

        assert_eq!(extraction.items.len(), 2);
        let first = &extraction.items[0];
        assert_eq!(
            text(first, "text"),
            Some("“The world as we have created it is a process of our thinking.”")
        );
        assert_eq!(text(first, "author"), Some("Albert Einstein"));
        assert_eq!(
            first.get("tags").and_then(FieldValue::as_list),
            Some(&["change".to_string(), "thinking".to_string()][..])
        );

        let field_names: Vec<&str> = first.fields().map(|(name, _)| name).collect();
        assert_eq!(field_names, vec!["text", "author", "tags"]);

        // Without author following only the next page is discovered
        let links: Vec<&str> = extraction.links.iter().map(Location::as_str).collect();
        assert_eq!(links, vec!["https://quotes.toscrape.com/page/2/"]);
    }

    #[test]
    fn test_quote_without_tags_has_empty_list() {
        let spider = QuoteSpider::new().unwrap();
        let extraction = spider.extract(&page("/", LISTING)).unwrap();
        assert_eq!(
            extraction.items[1].get("tags"),
            Some(&FieldValue::List(vec![]))
        );
    }

    #[test]
    fn test_authors_followed_before_next_page() {
        let spider = QuoteSpider::with_authors().unwrap();
        let extraction = spider.extract(&page("/", LISTING)).unwrap();

        let links: Vec<&str> = extraction.links.iter().map(Location::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://quotes.toscrape.com/author/Albert-Einstein",
                "https://quotes.toscrape.com/author/J-K-Rowling",
                "https://quotes.toscrape.com/page/2/",
            ]
        );
    }

    #[test]
    fn test_author_page() {
        let spider = QuoteSpider::with_authors().unwrap();
        let extraction = spider
            .extract(&page("/author/Albert-Einstein", AUTHOR))
            .unwrap();

        assert!(extraction.links.is_empty());
        let author = &extraction.items[0];
        assert_eq!(text(author, "name"), Some("Albert Einstein"));
        assert_eq!(text(author, "birth_date"), Some("March 14, 1879"));
        assert_eq!(text(author, "birth_location"), Some("in Ulm, Germany"));
        assert_eq!(
            text(author, "description"),
            Some("In 1879, Albert Einstein was born in Ulm, Germany.")
        );
    }

    #[test]
    fn test_author_page_without_description_is_malformed() {
        let spider = QuoteSpider::with_authors().unwrap();
        let body = r#"<html><body><h3 class="author-title">Nobody</h3></body></html>"#;
        let error = spider.extract(&page("/author/Nobody", body)).unwrap_err();

        assert!(matches!(
            error,
            ExtractError::MissingField {
                field: "description",
                ..
            }
        ));
    }

    #[test]
    fn test_quote_without_text_keeps_links() {
        let spider = QuoteSpider::new().unwrap();
        let body = r#"
            <div class="quote"><small class="author">Anon</small></div>
            <li class="next"><a href="/page/3/">Next</a></li>
        "#;
        let error = spider.extract(&page("/page/2/", body)).unwrap_err();
        let links = error.into_recovered_links();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://quotes.toscrape.com/page/3/");
    }

    #[test]
    fn test_missing_author_is_null() {
        let spider = QuoteSpider::new().unwrap();
        let body = r#"<div class="quote"><span class="text">Hi</span></div>"#;
        let extraction = spider.extract(&page("/", body)).unwrap();

        assert!(extraction.items[0].get("author").unwrap().is_missing());
        assert!(extraction.links.is_empty());
    }

    #[test]
    fn test_links_resolve_against_final_location() {
        let spider = QuoteSpider::new().unwrap();
        let mut redirected = page("/", LISTING);
        redirected.final_location = Location::parse("https://mirror.example.org/quotes/").unwrap();

        let extraction = spider.extract(&redirected).unwrap();
        assert_eq!(
            extraction.links[0].as_str(),
            "https://mirror.example.org/page/2/"
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(QuoteSpider::new().unwrap().name(), "quotes");
        assert_eq!(
            QuoteSpider::with_authors().unwrap().name(),
            "quotes-with-authors"
        );
    }
}
