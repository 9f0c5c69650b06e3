//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use futures::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use sumi_harvest::config::{parse_config, Config, SpiderKind};
use sumi_harvest::crawler::{crawl, run_crawl, CrawlOptions, Fetcher, HttpFetcher};
use sumi_harvest::spiders::QuoteSpider;
use sumi_harvest::{FetchError, Item, Location};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the given spider and start URLs
fn create_test_config(kind: &str, start_urls: &[String], items_path: &str) -> Config {
    let start_urls = start_urls
        .iter()
        .map(|url| format!("\"{}\"", url))
        .collect::<Vec<_>>()
        .join(", ");

    parse_config(&format!(
        r#"
        [crawler]
        max-concurrent-fetches = 1
        request-timeout = 5

        [user-agent]
        crawler-name = "TestBot"
        crawler-version = "1.0.0"
        contact-url = "https://example.com/contact"
        contact-email = "test@example.com"

        [output]
        items-path = "{}"

        [spider]
        kind = "{}"
        start-urls = [{}]
        "#,
        items_path.replace('\\', "/"),
        kind,
        start_urls
    ))
    .expect("Failed to build test config")
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html; charset=utf-8")
}

fn quote(text: &str, author: &str, author_href: &str, tags: &[&str]) -> String {
    let tags: String = tags
        .iter()
        .map(|t| format!(r#"<a class="tag" href="/tag/{t}/">{t}</a>"#))
        .collect();
    format!(
        r#"<div class="quote">
            <span class="text">{text}</span>
            <span>by <small class="author">{author}</small>
            <a href="{author_href}">(about)</a></span>
            <div class="tags">{tags}</div>
        </div>"#
    )
}

fn listing(quotes: &[String], next: Option<&str>) -> String {
    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{href}">Next</a></li></ul>"#))
        .unwrap_or_default();
    format!(
        "<html><head><title>Quotes</title></head><body>{}{}</body></html>",
        quotes.join("\n"),
        pager
    )
}

fn author_page(name: &str, born: &str, description: &str) -> String {
    format!(
        r#"<html><body><div class="author-details">
            <h3 class="author-title">{name}</h3>
            <p><strong>Born:</strong> <span class="author-born-date">{born}</span>
            <span class="author-born-location">in Ulm, Germany</span></p>
            <div class="author-description">
                {description}
            </div>
        </div></body></html>"#
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(hits)
        .mount(server)
        .await;
}

fn read_items(dir: &TempDir) -> Vec<Value> {
    let written = std::fs::read_to_string(dir.path().join("items.json"))
        .expect("Items file was not written");
    serde_json::from_str(&written).expect("Items file is not a JSON array")
}

fn items_path(dir: &TempDir) -> String {
    dir.path().join("items.json").to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_quotes_follow_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(listing(
            &[
                quote("“First”", "Albert Einstein", "/author/Albert-Einstein/", &["change", "world"]),
                quote("“Second”", "Jane Austen", "/author/Jane-Austen/", &[]),
            ],
            Some("/page/2/"),
        )),
        1,
    )
    .await;
    mount(
        &server,
        "/page/2/",
        html(listing(
            &[quote("“Third”", "Steve Martin", "/author/Steve-Martin/", &["humor"])],
            None,
        )),
        1,
    )
    .await;
    // Plain quotes never visit author pages
    mount(&server, "/author/Albert-Einstein/", html(""), 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config("quotes", &[format!("{}/", base)], &items_path(&dir));

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.items_emitted, 3);

    let items = read_items(&dir);
    assert_eq!(
        items,
        vec![
            json!({"text": "“First”", "author": "Albert Einstein", "tags": ["change", "world"]}),
            json!({"text": "“Second”", "author": "Jane Austen", "tags": []}),
            json!({"text": "“Third”", "author": "Steve Martin", "tags": ["humor"]}),
        ]
    );
}

#[tokio::test]
async fn test_shared_author_page_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(listing(
            &[
                quote("“One”", "Albert Einstein", "/author/Albert-Einstein/", &[]),
                quote("“Two”", "Albert Einstein", "/author/Albert-Einstein/", &[]),
            ],
            Some("/page/2/"),
        )),
        1,
    )
    .await;
    mount(
        &server,
        "/page/2/",
        html(listing(
            &[quote("“Three”", "Albert Einstein", "/author/Albert-Einstein/", &[])],
            None,
        )),
        1,
    )
    .await;
    mount(
        &server,
        "/author/Albert-Einstein/",
        html(author_page(
            "Albert Einstein",
            "March 14, 1879",
            "Theoretical physicist.",
        )),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        "quotes-with-authors",
        &[format!("{}/", base)],
        &items_path(&dir),
    );

    let stats = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(stats.pages_fetched, 3);
    assert!(stats.duplicate_links >= 2);

    // Breadth-first: the author page was discovered before page 2
    let items = read_items(&dir);
    let texts: Vec<&str> = items
        .iter()
        .map(|item| {
            item.get("text")
                .or_else(|| item.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
        })
        .collect();
    assert_eq!(texts, vec!["“One”", "“Two”", "Albert Einstein", "“Three”"]);

    assert_eq!(
        items[2],
        json!({
            "name": "Albert Einstein",
            "birth_date": "March 14, 1879",
            "birth_location": "in Ulm, Germany",
            "description": "Theoretical physicist."
        })
    );
}

#[tokio::test]
async fn test_failed_page_is_reported_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(listing(
            &[quote("“Lost author”", "Nobody", "/author/Nobody/", &[])],
            Some("/page/2/"),
        )),
        1,
    )
    .await;
    mount(&server, "/author/Nobody/", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/page/2/",
        html(listing(&[quote("“Still here”", "Somebody", "/author/Nobody/", &[])], None)),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(
        "quotes-with-authors",
        &[format!("{}/", base)],
        &items_path(&dir),
    );

    let stats = run_crawl(config).await.expect("A failed page must not abort the crawl");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.pages_failed, 1);
    assert_eq!(
        stats.failures[0].location.as_str(),
        format!("{}/author/Nobody/", base)
    );
    assert!(stats.failures[0].reason.contains("404"));

    let items = read_items(&dir);
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["text"], "“Still here”");
}

#[tokio::test]
async fn test_page_outline_does_not_follow_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(
            r#"<html><body>
            <h1>Welcome</h1>
            <a href="/about">About us</a>
            <a href="/empty"></a>
            <h2> News </h2>
            </body></html>"#,
        ),
        1,
    )
    .await;
    mount(&server, "/about", html("<html></html>"), 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config("page-outline", &[format!("{}/", base)], &items_path(&dir));

    let stats = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(stats.pages_fetched, 1);

    assert_eq!(
        read_items(&dir),
        vec![
            json!({"href": "/about", "text": "About us"}),
            json!({"heading": "h1", "text": "Welcome"}),
            json!({"heading": "h2", "text": "News"}),
        ]
    );
}

#[tokio::test]
async fn test_page_budget_stops_pagination() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/", html(listing(&[quote("“1”", "A", "/a/", &[])], Some("/page/2/"))), 1).await;
    mount(&server, "/page/2/", html(listing(&[quote("“2”", "B", "/b/", &[])], Some("/page/3/"))), 1).await;
    mount(&server, "/page/3/", html(listing(&[quote("“3”", "C", "/c/", &[])], None)), 0).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("quotes", &[format!("{}/", base)], &items_path(&dir));
    config.crawler.max_pages = Some(2);

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.pages_fetched, 2);
    let texts: Vec<Value> = read_items(&dir).into_iter().map(|i| i["text"].clone()).collect();
    assert_eq!(texts, vec![json!("“1”"), json!("“2”")]);
}

#[tokio::test]
async fn test_only_failing_start_page_writes_empty_array() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/", ResponseTemplate::new(500), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config("quotes", &[format!("{}/", base)], &items_path(&dir));

    let stats = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(stats.pages_failed, 1);
    assert!(read_items(&dir).is_empty());
}

#[tokio::test]
async fn test_library_stream_with_concurrent_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(
        &server,
        "/",
        html(listing(
            &[
                quote("“A”", "Ann", "/author/Ann/", &[]),
                quote("“B”", "Ben", "/author/Ben/", &[]),
            ],
            Some("/page/2/"),
        )),
        1,
    )
    .await;
    mount(
        &server,
        "/page/2/",
        html(listing(&[quote("“C”", "Ann", "/author/Ann/", &[])], None)),
        1,
    )
    .await;
    mount(
        &server,
        "/author/Ann/",
        html(author_page("Ann", "Jan 1, 1900", "Writer.")).set_delay(Duration::from_millis(50)),
        1,
    )
    .await;
    mount(&server, "/author/Ben/", html(author_page("Ben", "", "Poet.")), 1).await;

    let config = create_test_config("quotes-with-authors", &[format!("{}/", base)], "unused.json");
    assert_eq!(config.spider.kind, SpiderKind::QuotesWithAuthors);

    let fetcher = HttpFetcher::from_config(&config).unwrap();
    let start = vec![Location::parse(&format!("{}/", base)).unwrap()];
    let options = CrawlOptions {
        max_pages: None,
        concurrency: 4,
    };

    let items: Vec<Item> = crawl(fetcher, QuoteSpider::with_authors().unwrap(), start, options)
        .unwrap()
        .collect()
        .await;

    // The first page completes alone, so its items lead in order
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].get("text").and_then(|v| v.as_text()), Some("“A”"));
    assert_eq!(items[1].get("text").and_then(|v| v.as_text()), Some("“B”"));

    let mut names: Vec<&str> = items
        .iter()
        .filter_map(|item| item.get("name").and_then(|v| v.as_text()))
        .collect();
    names.sort();
    assert_eq!(names, vec!["Ann", "Ben"]);
}

#[tokio::test]
async fn test_http_fetcher_classifies_responses() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount(&server, "/broken", ResponseTemplate::new(500), 1).await;
    mount(
        &server,
        "/data.json",
        ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
        1,
    )
    .await;
    mount(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()),
        1,
    )
    .await;
    mount(&server, "/new", html("<html><title>New</title></html>"), 1).await;

    let config = create_test_config("quotes", &[format!("{}/", base)], "unused.json");
    let fetcher = HttpFetcher::from_config(&config).unwrap();
    let at = |route: &str| Location::parse(&format!("{}{}", base, route)).unwrap();

    match fetcher.fetch(&at("/broken")).await {
        Err(FetchError::Status { status, location }) => {
            assert_eq!(status, 500);
            assert_eq!(location, at("/broken"));
        }
        other => panic!("Expected a status error, got {:?}", other),
    }

    assert!(matches!(
        fetcher.fetch(&at("/data.json")).await,
        Err(FetchError::ContentMismatch { .. })
    ));

    let page = fetcher.fetch(&at("/old")).await.expect("Redirect should be followed");
    assert!(page.was_redirected());
    assert_eq!(page.location, at("/old"));
    assert_eq!(page.final_location, at("/new"));
    assert!(page.body.contains("New"));
}

#[tokio::test]
async fn test_empty_start_urls_rejected_by_config() {
    let result = parse_config(
        r#"
        [crawler]

        [user-agent]
        crawler-name = "TestBot"
        crawler-version = "1.0.0"
        contact-url = "https://example.com/contact"
        contact-email = "test@example.com"

        [spider]
        kind = "quotes"
        start-urls = []
        "#,
    );
    assert!(result.is_err());
}
