//! HTML query helpers
//!
//! Thin wrappers over `scraper` for the lookups extractors repeat:
//! trimmed text of one or all matches, and the first attribute value.

use scraper::{ElementRef, Selector};

/// Collects the text of an element and trims it
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, if any match has text
pub fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Trimmed, non-empty text of every match, in document order
pub fn all_text(scope: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    scope
        .select(selector)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Attribute value of the first match carrying that attribute
pub fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::to_string)
}
