use crate::model::ItemRecord;

/// Number of records gathered for one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub name: String,
    pub records: usize,
}

/// Final aggregate of a successful crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub total_records: usize,
    pub records: Vec<ItemRecord>,
    pub categories: Vec<CategoryTally>,
}

impl CrawlOutcome {
    /// Concatenates per-category record lists, keeping their order
    ///
    /// The resulting sequence is category-major, page-minor.
    pub fn aggregate(walks: Vec<(String, Vec<ItemRecord>)>) -> Self {
        let total_records = walks.iter().map(|(_, records)| records.len()).sum();
        let mut records = Vec::with_capacity(total_records);
        let mut categories = Vec::with_capacity(walks.len());

        for (name, walked) in walks {
            categories.push(CategoryTally {
                name,
                records: walked.len(),
            });
            records.extend(walked);
        }

        Self {
            total_records,
            records,
            categories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
