use serde::{Deserialize, Serialize};

/// A category discovered on the listing-index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLink {
    /// Display name derived from the category URL (e.g. "Historical fiction")
    pub name: String,

    /// Absolute URL of the category's first listing page
    pub url: String,
}

/// One catalog item as it appears on a listing page
///
/// Price and rating stay in their raw textual form (`"£51.77"`, `"Three"`);
/// the cleaning stage turns them into numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    pub category: String,
    pub price: String,
    pub rating: String,
}

/// Records extracted from one item-listing page plus the pagination pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<ItemRecord>,

    /// Absolute URL of the next page; `None` on the last page of a category
    pub next_page_url: Option<String>,
}

impl PageResult {
    /// Returns true if this is the last page of its category
    pub fn is_last(&self) -> bool {
        self.next_page_url.is_none()
    }
}
