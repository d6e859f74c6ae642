//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock catalog sites and test
//! the full crawl cycle end-to-end: permission check, category
//! enumeration, pagination, persistence and the cleaning stage.

mod common;

use common::{base_url, index_html, listing_html, mount_page, mount_robots, test_config};
use shelf_trawl::crawler::{run_crawl, Coordinator};
use shelf_trawl::etl::run_etl;
use shelf_trawl::storage::{JsonFileStore, RecordStore, SqliteStore};
use shelf_trawl::TrawlError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALLOW_ALL: &str = "User-agent: *\nAllow: /";
const POETRY: &str = "catalogue/category/books/poetry_23/index.html";
const TRAVEL: &str = "catalogue/category/books/travel_2/index.html";
const MYSTERY: &str = "catalogue/category/books/mystery_3/index.html";

/// Mounts a two-page Poetry category (3 + 2 items) behind the index page
async fn mount_poetry_site(server: &MockServer) {
    mount_page(server, "/", index_html(&[POETRY])).await;
    mount_page(
        server,
        "/catalogue/category/books/poetry_23/index.html",
        listing_html(
            &[
                ("Olio", "£23.88", "One"),
                ("Rip it Up and Start Again", "£35.02", "Five"),
                ("Shakespeare's Sonnets", "£20.66", "Four"),
            ],
            Some("page-2.html"),
        ),
    )
    .await;
    mount_page(
        server,
        "/catalogue/category/books/poetry_23/page-2.html",
        listing_html(
            &[
                ("The Black Maria", "£52.15", "One"),
                ("Set Me Free", "Â£17.46", "Five"),
            ],
            None,
        ),
    )
    .await;
}

async fn mount_forbidden_index(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html(&[POETRY])))
        .expect(0)
        .mount(server)
        .await;
}

fn raw_path(config: &shelf_trawl::Config) -> &Path {
    Path::new(&config.output.raw_path)
}

#[tokio::test]
async fn test_full_crawl_single_category() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_poetry_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let report = run_crawl(&config, &mut store).await.unwrap();

    assert_eq!(report.total_records, 5);
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].name, "Poetry");
    assert_eq!(report.categories[0].records, 5);

    let records = store.load().unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Olio",
            "Rip it Up and Start Again",
            "Shakespeare's Sonnets",
            "The Black Maria",
            "Set Me Free",
        ]
    );
    assert!(records.iter().all(|r| r.category == "Poetry"));
    assert_eq!(records[4].price, "£17.46");
    assert_eq!(records[1].rating, "Five");
}

#[tokio::test]
async fn test_crawl_then_clean_writes_csv() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_poetry_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    run_crawl(&config, &mut store).await.unwrap();
    let processed = Path::new(&config.output.processed_path);
    let rows = run_etl(&store, processed).unwrap();

    assert_eq!(rows, 5);
    let csv = std::fs::read_to_string(processed).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "title;category;price;rating");
    assert_eq!(lines[1], "Olio;Poetry;23.88;1");
    assert_eq!(lines[5], "Set Me Free;Poetry;17.46;5");
}

#[tokio::test]
async fn test_sqlite_sink_receives_records() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_poetry_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = SqliteStore::open(Path::new(&config.output.database_path), "hash").unwrap();

    let report = run_crawl(&config, &mut store).await.unwrap();

    assert!(report.destination.starts_with("SQLite database"));
    assert_eq!(store.load().unwrap().len(), 5);
}

#[tokio::test]
async fn test_robots_disallow_stops_before_any_page() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /").await;
    mount_forbidden_index(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    match result {
        Err(e) => assert!(e.is_permission_denied(), "unexpected error: {}", e),
        Ok(_) => panic!("crawl should have been refused"),
    }
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_robots_disallow_matches_non_ascii_base_path() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: *\nDisallow: /café/").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html(&[POETRY])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let base = format!("{}/café/", server.uri());
    let config = test_config(&base, dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    assert!(matches!(result, Err(TrawlError::PermissionDenied { .. })));
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_robots_forbidden_status_denies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_forbidden_index(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let coordinator = Coordinator::new(&config).unwrap();

    let result = coordinator.run().await;

    assert!(matches!(result, Err(TrawlError::PermissionDenied { .. })));
}

#[tokio::test]
async fn test_robots_server_error_denies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_forbidden_index(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let coordinator = Coordinator::new(&config).unwrap();

    let result = coordinator.run().await;

    assert!(matches!(result, Err(TrawlError::PermissionDenied { .. })));
}

#[tokio::test]
async fn test_unreachable_robots_denies() {
    let dir = TempDir::new().unwrap();
    let config = test_config("http://127.0.0.1:1/", dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    assert!(matches!(result, Err(TrawlError::PermissionDenied { .. })));
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_poetry_site(&server).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let coordinator = Coordinator::new(&config).unwrap();

    let outcome = coordinator.run().await.unwrap();

    assert_eq!(outcome.total_records, 5);
}

#[tokio::test]
async fn test_failing_category_page_aborts_run() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", index_html(&[POETRY])).await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/poetry_23/index.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    assert!(matches!(
        result,
        Err(TrawlError::HttpStatus { status: 404, .. })
    ));
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_page_without_items_is_a_shape_error() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", index_html(&[POETRY])).await;
    mount_page(
        &server,
        "/catalogue/category/books/poetry_23/index.html",
        "<html><body><p>Nothing here</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    match result {
        Err(TrawlError::ParseShape { url, .. }) => assert!(url.ends_with("poetry_23/index.html")),
        other => panic!("expected ParseShape, got {:?}", other.map(|r| r.total_records)),
    }
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_pagination_cycle_is_a_shape_error() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", index_html(&[POETRY])).await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/poetry_23/index.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Olio", "£23.88", "One")],
            Some("page-2.html"),
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/poetry_23/page-2.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(
            &[("Set Me Free", "£17.46", "Five")],
            Some("index.html"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = tokio::time::timeout(Duration::from_secs(10), run_crawl(&config, &mut store))
        .await
        .expect("a looping pager must not hang the crawl");

    match result {
        Err(TrawlError::ParseShape { url, message }) => {
            assert!(url.ends_with("poetry_23/index.html"));
            assert!(message.contains("loops back"), "unexpected message: {}", message);
        }
        other => panic!("expected ParseShape, got {:?}", other.map(|r| r.total_records)),
    }
    assert!(!raw_path(&config).exists());
}

#[tokio::test]
async fn test_index_without_navigation_is_a_shape_error() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", "<html><body>maintenance</body></html>".to_string()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 1);
    let coordinator = Coordinator::new(&config).unwrap();

    let result = coordinator.run().await;

    assert!(matches!(result, Err(TrawlError::ParseShape { .. })));
}

#[tokio::test]
async fn test_concurrent_walks_keep_discovery_order() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", index_html(&[TRAVEL, MYSTERY])).await;

    // The first category answers slowly so the second one finishes first
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/travel_2/index.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(
                    &[
                        ("It's Only the Himalayas", "£45.17", "Two"),
                        ("Full Moon over Noah's Ark", "£49.43", "Four"),
                    ],
                    None,
                ))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/catalogue/category/books/mystery_3/index.html",
        listing_html(&[("Sharp Objects", "£47.82", "Four")], Some("page-2.html")),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/category/books/mystery_3/page-2.html",
        listing_html(&[("In a Dark, Dark Wood", "£19.63", "One")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 2);
    let coordinator = Coordinator::new(&config).unwrap();

    let outcome = coordinator.run().await.unwrap();

    let tallies: Vec<(&str, usize)> = outcome
        .categories
        .iter()
        .map(|c| (c.name.as_str(), c.records))
        .collect();
    assert_eq!(tallies, vec![("Travel", 2), ("Mystery", 2)]);

    let categories: Vec<&str> = outcome.records.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["Travel", "Travel", "Mystery", "Mystery"]);
    assert_eq!(outcome.records[3].title, "In a Dark, Dark Wood");
}

#[tokio::test]
async fn test_concurrent_failure_aborts_run() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL).await;
    mount_page(&server, "/", index_html(&[TRAVEL, MYSTERY])).await;
    mount_page(
        &server,
        "/catalogue/category/books/travel_2/index.html",
        listing_html(&[("It's Only the Himalayas", "£45.17", "Two")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/catalogue/category/books/mystery_3/index.html"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url(&server), dir.path(), 2);
    let mut store = JsonFileStore::new(&config.output.raw_path);

    let result = run_crawl(&config, &mut store).await;

    assert!(matches!(
        result,
        Err(TrawlError::HttpStatus { status: 403, .. })
    ));
    assert!(!raw_path(&config).exists());
}
