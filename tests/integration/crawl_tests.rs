//! Integration tests for the crawler
//!
//! These tests use wiremock to serve small sites and run the HTTP fetcher
//! and the breadth-first crawler against them end-to-end.

use reach::config::UserAgentConfig;
use reach::crawler::{CrawlError, CrawlOptions, FetchResult, Fetcher, HttpFetcher, SiteCrawler};
use reach::ReachError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn test_crawler() -> SiteCrawler {
    let user_agent = UserAgentConfig {
        name: "ReachTest".to_string(),
        version: "1.0.0".to_string(),
        contact_url: None,
    };
    SiteCrawler::from_config(&user_agent).expect("Failed to build crawler")
}

#[tokio::test]
async fn test_crawl_three_page_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a> <a href="/contact">Contact</a>"#,
    )
    .await;
    mount_page(&server, "/about", "About us").await;
    mount_page(&server, "/contact", "Contact us").await;

    let options = CrawlOptions {
        max_pages: 10,
        max_depth: 1,
        ..Default::default()
    };
    let result = test_crawler().crawl(&base, &options).await.unwrap();

    assert_eq!(
        result.pages,
        vec![
            format!("{}/", base),
            format!("{}/about", base),
            format!("{}/contact", base),
        ]
    );
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_external_links_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="https://external.example/page">Elsewhere</a> <a href="/local">Local</a>"#,
    )
    .await;
    mount_page(&server, "/local", "Local page").await;

    let result = test_crawler()
        .crawl(&base, &CrawlOptions::default())
        .await
        .unwrap();

    assert!(result.skipped > 0);
    assert!(!result.pages.iter().any(|p| p.contains("external.example")));
    assert_eq!(result.pages, vec![format!("{}/", base), format!("{}/local", base)]);
}

#[tokio::test]
async fn test_page_cap_keeps_first_discovered() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/one">1</a> <a href="/two">2</a> <a href="/three">3</a>"#,
    )
    .await;
    for route in ["/one", "/two", "/three"] {
        mount_page(&server, route, "Leaf").await;
    }

    let options = CrawlOptions {
        max_pages: 2,
        ..Default::default()
    };
    let result = test_crawler().crawl(&base, &options).await.unwrap();

    assert_eq!(result.pages, vec![format!("{}/", base), format!("{}/one", base)]);
}

#[tokio::test]
async fn test_trailing_slash_variants_visited_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/profile">Profile</a> <a href="/profile/">Profile again</a> <a href="/profile#bio">Bio</a>"#,
    )
    .await;
    mount_page(&server, "/profile", "Profile").await;

    let result = test_crawler()
        .crawl(&base, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(
        result.pages,
        vec![format!("{}/", base), format!("{}/profile", base)]
    );
    assert_eq!(result.skipped, 2);
}

#[tokio::test]
async fn test_missing_page_recorded_as_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/gone">Gone</a>"#).await;
    // No mock for /gone: wiremock answers 404

    let result = test_crawler()
        .crawl(&base, &CrawlOptions::default())
        .await
        .unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(
        result.errors,
        vec![CrawlError {
            url: format!("{}/gone", base),
            error: "HTTP 404 Not Found".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_invalid_start_url() {
    let err = test_crawler()
        .crawl("::not a url::", &CrawlOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ReachError::InvalidStartUrl(_)));
}

#[tokio::test]
async fn test_fetcher_sends_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "ReachTest/1.0.0 (+https://example.com/about)"))
        .respond_with(html("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&UserAgentConfig {
        name: "ReachTest".to_string(),
        version: "1.0.0".to_string(),
        contact_url: Some("https://example.com/about".to_string()),
    })
    .unwrap();

    let fetched = fetcher.fetch(&format!("{}/", server.uri())).await;
    assert!(matches!(fetched, FetchResult::Success { status_code: 200, .. }));
}

#[tokio::test]
async fn test_fetcher_server_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::from_config(&UserAgentConfig::default()).unwrap();
    let fetched = fetcher.fetch(&format!("{}/", server.uri())).await;

    assert_eq!(
        fetched.error_message().as_deref(),
        Some("HTTP 500 Internal Server Error")
    );
    assert!(fetched.body().is_none());
}

#[tokio::test]
async fn test_redirect_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/new", "Moved here").await;

    let fetcher = HttpFetcher::from_config(&UserAgentConfig::default()).unwrap();
    match fetcher.fetch(&format!("{}/old", base)).await {
        FetchResult::Success {
            final_url, body, ..
        } => {
            assert_eq!(final_url, format!("{}/new", base));
            assert!(body.contains("Moved here"));
        }
        other => panic!("expected success, got {:?}", other),
    }
}
