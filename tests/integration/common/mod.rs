//! Shared fixtures for the integration tests
//!
//! Pages mimic the catalog markup: a listing-index page with a breadcrumb,
//! a nested category list and a pager, and item-listing pages made of
//! `article` containers.

#![allow(dead_code)]

use shelf_trawl::config::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, RobotsConfig, TargetConfig,
};
use shelf_trawl::crawler::{build_http_client, Fetcher, RetryPolicy, UserAgentPool};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_AGENTS: [&str; 2] = ["TestAgent/1.0", "TestAgent/2.0"];

/// Base URL of a mock server, with the trailing slash category hrefs expect
pub fn base_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

/// Builds a config with fast retries, writing into `out_dir`
pub fn test_config(base_url: &str, out_dir: &Path, concurrency: u32) -> Config {
    Config {
        target: TargetConfig {
            base_url: base_url.to_string(),
        },
        fetch: FetchConfig {
            max_retries: 3,
            timeout_secs: 2,
            backoff_base_ms: 1,
            proxy: None,
            user_agents: TEST_AGENTS.iter().map(|a| a.to_string()).collect(),
        },
        robots: RobotsConfig::default(),
        crawler: CrawlerConfig {
            max_concurrent_categories: concurrency,
        },
        output: OutputConfig {
            raw_path: out_dir.join("raw").join("books.json").display().to_string(),
            database_path: out_dir.join("raw").join("books.db").display().to_string(),
            processed_path: out_dir
                .join("processed")
                .join("books.csv")
                .display()
                .to_string(),
            ..OutputConfig::default()
        },
    }
}

/// A fetcher using the test identities and the given retry policy
pub fn test_fetcher(max_retries: u32, timeout: Duration, backoff_base: Duration) -> Fetcher {
    let pool = UserAgentPool::new(TEST_AGENTS.iter().map(|a| a.to_string()).collect())
        .expect("test pool is valid");
    let client = build_http_client(None).expect("client builds");
    Fetcher::new(
        client,
        pool,
        RetryPolicy {
            max_retries,
            timeout,
            backoff_base,
        },
    )
}

pub fn index_html(category_hrefs: &[&str]) -> String {
    let categories: String = category_hrefs
        .iter()
        .map(|href| format!(r#"<li><a href="{}">category</a></li>"#, href))
        .collect();
    format!(
        r#"<html><body>
        <ul class="breadcrumb"><li><a href="index.html">Home</a></li></ul>
        <ul class="nav nav-list"><li><a href="catalogue/category/books_1/index.html">Books</a>
          <ul>{}</ul></li></ul>
        <ul class="pager"><li class="next"><a href="catalogue/page-2.html">next</a></li></ul>
        </body></html>"#,
        categories
    )
}

pub fn listing_html(items: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let articles: String = items
        .iter()
        .map(|(title, price, rating)| {
            format!(
                r#"<article class="product_pod">
                  <p class="star-rating {rating}"></p>
                  <h3><a href="item.html" title="{title}">{title}</a></h3>
                  <div class="product_price"><p class="price_color">{price}</p></div>
                </article>"#
            )
        })
        .collect();
    let pager = next
        .map(|href| {
            format!(
                r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(r#"<html><body><ol>{}</ol>{}</body></html>"#, articles, pager)
}

pub async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}
