/// Derives a category's display name from its listing URL
///
/// Takes the last-but-one path segment (`historical-fiction_4` in
/// `.../books/historical-fiction_4/index.html`), keeps the part before the
/// first `_`, capitalizes it and turns `-` into spaces.
///
/// Returns `None` if the URL has fewer than two segments or the name
/// comes out empty.
///
/// # Examples
///
/// ```
/// use shelf_trawl::url::category_name_from_url;
///
/// let name = category_name_from_url(
///     "https://books.toscrape.com/catalogue/category/books/historical-fiction_4/index.html",
/// );
/// assert_eq!(name.as_deref(), Some("Historical fiction"));
/// ```
pub fn category_name_from_url(url: &str) -> Option<String> {
    let segment = url.rsplit('/').nth(1)?;
    let slug = segment.split('_').next().unwrap_or(segment);
    let name = capitalize(slug).replace('-', " ");

    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Upper-cases the first character and lower-cases the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
