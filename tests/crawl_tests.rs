//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from the seed through robots.txt,
//! fetching, extraction and link cleaning into the index.

use std::sync::Arc;
use std::time::{Duration, Instant};
use sumi_seek::config::{Config, CrawlerConfig, IndexBackend, IndexConfig};
use sumi_seek::crawler::Coordinator;
use sumi_seek::index::{open_index, Analyzer, MemoryIndex, SearchIndex};
use sumi_seek::state::{PageState, StopReason};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with small pools and no default delay
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            fetch_workers: 4,
            extract_workers: 2,
            clean_workers: 4,
            queue_capacity: 8,
            default_crawl_delay_ms: 0,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(title, body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_crawl_follows_same_host_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow:").await;
    mount_page(
        &mock_server,
        "/",
        "Home",
        r#"<a href="/a">A</a> <a href="/b">B</a> <a href="/off">Off</a>
           <a href="mailto:someone@example.com">Mail</a>
           <a href="https://elsewhere.example.org/">Elsewhere</a>"#,
    )
    .await;
    mount_page(&mock_server, "/a", "A", "apples").await;
    mount_page(&mock_server, "/b", "B", r#"bananas <a href="/a">back to A</a>"#).await;
    mount_page(&mock_server, "/off", "Off", "oranges").await;

    let index = Arc::new(MemoryIndex::new());
    let coordinator =
        Coordinator::new(&create_test_config(), index.clone(), Arc::new(Analyzer::english()))
            .expect("Failed to create coordinator");
    let report = coordinator
        .run(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");

    let mut visited: Vec<&str> = report.visited.keys().map(String::as_str).collect();
    visited.sort();
    let expected = [
        format!("{}/", base_url),
        format!("{}/a", base_url),
        format!("{}/b", base_url),
        format!("{}/off", base_url),
    ];
    assert_eq!(visited, expected.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(report
        .visited
        .values()
        .all(|state| *state == PageState::Indexed));
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert!(!report.was_cut_short());

    assert_eq!(index.total_docs().unwrap(), 4);
    assert_eq!(coordinator.robots().robots_fetches(), 1);
}

#[tokio::test]
async fn test_robots_txt_wildcard_disallow() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: *chap21.html").await;
    mount_page(
        &mock_server,
        "/top10/index.html",
        "Top 10",
        r#"<a href="chap10.html">Chapter 10</a> <a href="chap21.html">Chapter 21</a>"#,
    )
    .await;
    mount_page(&mock_server, "/top10/chap10.html", "Chapter 10", "allowed chapter").await;

    // Should never be requested
    Mock::given(method("GET"))
        .and(path("/top10/chap21.html"))
        .respond_with(html_page("Chapter 21", "forbidden chapter"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let coordinator = Coordinator::new(
        &create_test_config(),
        Arc::new(MemoryIndex::new()),
        Arc::new(Analyzer::english()),
    )
    .expect("Failed to create coordinator");
    let report = coordinator
        .run(&format!("{}/top10/index.html", base_url))
        .await
        .expect("Crawl failed");

    let chap10 = format!("{}/top10/chap10.html", base_url);
    let chap21 = format!("{}/top10/chap21.html", base_url);
    assert!(report.was_fetched(&chap10));
    assert!(report.was_visited(&chap21));
    assert!(!report.was_fetched(&chap21));
    assert_eq!(report.visited.get(&chap21), Some(&PageState::Disallowed));
}

#[tokio::test]
async fn test_crawl_delay_spaces_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nCrawl-delay: 1").await;
    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a> "#, i, i))
        .collect();
    mount_page(&mock_server, "/", "Home", &links).await;
    for i in 0..12 {
        mount_page(&mock_server, &format!("/page{}", i), "Page", "content").await;
    }

    let coordinator = Coordinator::new(
        &create_test_config(),
        Arc::new(MemoryIndex::new()),
        Arc::new(Analyzer::english()),
    )
    .expect("Failed to create coordinator");

    let started = Instant::now();
    let report = coordinator
        .run(&format!("{}/", base_url))
        .await
        .expect("Crawl failed");
    let elapsed = started.elapsed();

    assert_eq!(report.visited.len(), 13);
    assert_eq!(report.pages_indexed, 13);
    assert!(
        elapsed >= Duration::from_secs(10),
        "Expected at least 10s with a 1s crawl delay, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_title_and_body_terms_are_indexed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "Alpha Beta", "Alpha").await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config();
    config.index = IndexConfig {
        backend: IndexBackend::Sqlite,
        database_path: dir.path().join("index.db").display().to_string(),
        reset: true,
    };
    let index = open_index(&config.index).unwrap();

    // no stopwords, so every token counts toward the length
    let analyzer = Arc::new(Analyzer::new(Vec::new()));
    let coordinator = Coordinator::new(&config, Arc::clone(&index), analyzer)
        .expect("Failed to create coordinator");
    let seed = format!("{}/", base_url);
    coordinator.run(&seed).await.expect("Crawl failed");

    let postings = index.postings("alpha").unwrap();
    assert_eq!(postings.len(), 1);
    assert_eq!(postings[0].url, seed);
    assert_eq!(postings[0].count, 2);
    assert_eq!(postings[0].doc_length, 3);

    let hits = index.tfidf("Alpha").unwrap();
    assert_eq!(hits.len(), 1);
    assert!((hits[0].tf - 2.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_unreachable_seed_finishes_with_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let index = Arc::new(MemoryIndex::new());
    let coordinator =
        Coordinator::new(&create_test_config(), index.clone(), Arc::new(Analyzer::english()))
            .expect("Failed to create coordinator");
    let seed = format!("{}/", base_url);
    let report = coordinator.run(&seed).await.expect("Crawl failed");

    assert_eq!(report.visited.get(&seed), Some(&PageState::FetchFailed));
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(index.total_docs().unwrap(), 0);
}
