//! URL handling module for Shelf-Trawl
//!
//! This module provides robots.txt location, base-URL joining, pagination
//! segment substitution and category-name derivation.

mod category;
mod pages;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use category::{capitalize, category_name_from_url};
pub use pages::{page_base_name, replace_page_name};

/// Parses a site URL, accepting only http and https
pub fn parse_site_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Derives the robots.txt location for a site
///
/// The result is `scheme://host[:port]/robots.txt`; path, query and
/// fragment of `base_url` are dropped.
///
/// # Examples
///
/// ```
/// use shelf_trawl::url::robots_url;
///
/// let url = robots_url("https://books.toscrape.com/catalogue/index.html").unwrap();
/// assert_eq!(url.as_str(), "https://books.toscrape.com/robots.txt");
/// ```
pub fn robots_url(base_url: &str) -> UrlResult<Url> {
    let mut url = parse_site_url(base_url)?;
    url.set_path("/robots.txt");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Builds an absolute URL from the catalog root and a relative href
///
/// This is plain concatenation: the catalog's hrefs are written relative
/// to its root, so `base_url` is expected to end with `/`.
pub fn join_base(base_url: &str, href: &str) -> String {
    format!("{}{}", base_url, href)
}
