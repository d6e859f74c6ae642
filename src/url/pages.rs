use crate::{UrlError, UrlResult};

const PAGE_SUFFIX: &str = ".html";

/// Returns the page name an href points at, without directories or extension
///
/// `"page-3.html"` and `"catalogue/page-3.html"` both give `"page-3"`.
pub fn page_base_name(href: &str) -> &str {
    let file = href.rsplit('/').next().unwrap_or(href);
    file.split('.').next().unwrap_or(file)
}

/// Swaps the final `.html` page name of `current_url` for `new_name`
///
/// Everything before the last `/` and the `.html` suffix are preserved.
///
/// # Examples
///
/// ```
/// use shelf_trawl::url::replace_page_name;
///
/// let next = replace_page_name("https://x.test/books/travel_2/index.html", "page-2").unwrap();
/// assert_eq!(next, "https://x.test/books/travel_2/page-2.html");
/// ```
pub fn replace_page_name(current_url: &str, new_name: &str) -> UrlResult<String> {
    let stem = current_url
        .strip_suffix(PAGE_SUFFIX)
        .ok_or_else(|| UrlError::NotAPage(current_url.to_string()))?;

    let dir_end = stem.rfind('/').map(|i| i + 1).unwrap_or(0);
    if dir_end == stem.len() || new_name.is_empty() {
        return Err(UrlError::NotAPage(current_url.to_string()));
    }

    Ok(format!("{}{}{}", &stem[..dir_end], new_name, PAGE_SUFFIX))
}
