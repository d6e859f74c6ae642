//! HTML parser for catalog pages
//!
//! This module handles parsing the two kinds of catalog pages:
//! - The listing-index page, which yields category links
//! - Item-listing pages, which yield item records and a pagination pointer
//!
//! Everything here is pure. A page that does not have the expected shape
//! is reported as an error instead of quietly producing empty output.

use crate::model::{CategoryLink, ItemRecord, PageResult};
use crate::url::{category_name_from_url, join_base, page_base_name, replace_page_name};
use scraper::{ElementRef, Html, Selector};

/// Navigation anchors; the first two and the last are not categories
const NAV_ANCHORS: &str = "ul li a";
const NAV_LEADING_SKIP: usize = 2;
const NAV_TRAILING_SKIP: usize = 1;

const ITEM_CONTAINER: &str = "article";
const ITEM_TITLE: &str = "h3 a";
const ITEM_PRICE: &str = "p.price_color";
const ITEM_RATING: &str = "p.star-rating";
const NEXT_CONTROL: &str = "li.next";
const NEXT_LINK: &str = "a[href]";

/// Mis-decoded bytes that precede the currency symbol in price cells
///
/// Longest sequence first so the double-encoded form is not half stripped.
const PRICE_ARTIFACTS: &[&str] = &["Ã‚", "Â"];

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
}

/// Extracts category links from the listing-index page
///
/// # Rules
///
/// - Anchors are matched by `ul li a`; the first two (home and
///   "all items") and the last (pagination) are dropped
/// - The absolute URL is `base_url` followed by the href
/// - The name comes from the URL's last-but-one path segment
///   (see [`category_name_from_url`])
/// - A name seen twice keeps its first position but takes the later URL
///
/// # Returns
///
/// * `Ok(Vec<CategoryLink>)` - Categories in document order
/// * `Err(String)` - Fewer than three anchors, an anchor without href,
///   or a URL that yields no name
pub fn extract_category_links(html: &str, base_url: &str) -> Result<Vec<CategoryLink>, String> {
    let document = Html::parse_document(html);
    let anchor_selector = selector(NAV_ANCHORS)?;

    let anchors: Vec<ElementRef> = document.select(&anchor_selector).collect();
    if anchors.len() < NAV_LEADING_SKIP + NAV_TRAILING_SKIP {
        return Err(format!(
            "expected at least {} navigation anchors, found {}",
            NAV_LEADING_SKIP + NAV_TRAILING_SKIP,
            anchors.len()
        ));
    }

    let mut categories: Vec<CategoryLink> = Vec::new();
    for anchor in &anchors[NAV_LEADING_SKIP..anchors.len() - NAV_TRAILING_SKIP] {
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| "navigation anchor without href".to_string())?;

        let url = join_base(base_url, href);
        let name = category_name_from_url(&url)
            .ok_or_else(|| format!("cannot derive a category name from {}", url))?;

        match categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                tracing::warn!(
                    "Category '{}' appears twice; {} replaces {}",
                    name,
                    url,
                    existing.url
                );
                existing.url = url;
            }
            None => categories.push(CategoryLink { name, url }),
        }
    }

    Ok(categories)
}

/// Extracts one record per item container on a listing page
///
/// Title comes from the `title` attribute of `h3 a`, price from the text
/// of `p.price_color` (encoding artifacts stripped), rating from the
/// second class of `p.star-rating`.
pub fn extract_item_records(html: &str, category: &str) -> Result<Vec<ItemRecord>, String> {
    let document = Html::parse_document(html);
    records_from_document(&document, category)
}

fn records_from_document(document: &Html, category: &str) -> Result<Vec<ItemRecord>, String> {
    let container_selector = selector(ITEM_CONTAINER)?;
    let title_selector = selector(ITEM_TITLE)?;
    let price_selector = selector(ITEM_PRICE)?;
    let rating_selector = selector(ITEM_RATING)?;

    let mut records = Vec::new();
    for (index, item) in document.select(&container_selector).enumerate() {
        let title = item
            .select(&title_selector)
            .next()
            .and_then(|a| a.value().attr("title"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("item {} has no title", index + 1))?;

        let price = item
            .select(&price_selector)
            .next()
            .map(|p| clean_price_text(&p.text().collect::<String>()))
            .ok_or_else(|| format!("item {} has no price", index + 1))?;

        let rating = item
            .select(&rating_selector)
            .next()
            .and_then(|p| p.value().attr("class"))
            .and_then(|classes| classes.split_whitespace().nth(1))
            .ok_or_else(|| format!("item {} has no rating class", index + 1))?;

        records.push(ItemRecord {
            title: title.to_string(),
            category: category.to_string(),
            price,
            rating: rating.to_string(),
        });
    }

    if records.is_empty() {
        return Err("no item containers found".to_string());
    }

    Ok(records)
}

/// Finds the next listing page, if any
///
/// # Returns
///
/// * `Ok(None)` - No "next" control; this is the last page
/// * `Ok(Some(url))` - `current_url` with its page name swapped for the
///   control's target
/// * `Err(String)` - A "next" control without a link, or a pointer that
///   cannot advance from `current_url`
pub fn extract_next_page_url(html: &str, current_url: &str) -> Result<Option<String>, String> {
    let document = Html::parse_document(html);
    extract_next_from_document(&document, current_url)
}

fn extract_next_from_document(
    document: &Html,
    current_url: &str,
) -> Result<Option<String>, String> {
    let next_selector = selector(NEXT_CONTROL)?;
    let link_selector = selector(NEXT_LINK)?;

    let Some(control) = document.select(&next_selector).next() else {
        return Ok(None);
    };

    let href = control
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| "next control has no link".to_string())?;

    let next_url =
        replace_page_name(current_url, page_base_name(href)).map_err(|e| e.to_string())?;

    if next_url == current_url {
        return Err(format!("next pointer does not advance past {}", current_url));
    }

    Ok(Some(next_url))
}

/// Parses an item-listing page into its records and pagination pointer
pub fn parse_listing_page(
    html: &str,
    category: &str,
    current_url: &str,
) -> Result<PageResult, String> {
    let document = Html::parse_document(html);
    let records = records_from_document(&document, category)?;
    let next_page_url = extract_next_from_document(&document, current_url)?;

    Ok(PageResult {
        records,
        next_page_url,
    })
}

fn clean_price_text(raw: &str) -> String {
    let mut price = raw.trim().to_string();
    for artifact in PRICE_ARTIFACTS {
        price = price.replace(artifact, "");
    }
    price
}
