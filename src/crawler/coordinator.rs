//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a single run through its stages:
//! - Permission check against robots.txt (once, before any page fetch)
//! - Category enumeration from the listing-index page
//! - One pagination walk per category
//! - Aggregation and a single hand-off to the record store
//!
//! Any failure after the permission check aborts the whole run and drops
//! whatever was gathered; nothing is persisted for an aborted run.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{extract_category_links, parse_listing_page};
use crate::model::{CategoryLink, CategoryTally, CrawlOutcome, CrawlTarget, ItemRecord};
use crate::robots::check_allowed;
use crate::storage::RecordStore;
use crate::TrawlError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Records gathered for one category, keyed by its display name
type CategoryWalk = (String, Vec<ItemRecord>);

/// Scoped timer for a crawl run
///
/// Logs the elapsed time when dropped, so the duration is reported on
/// every exit path including errors.
pub struct RunTimer {
    started: Instant,
}

impl RunTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for RunTimer {
    fn drop(&mut self) {
        tracing::info!(
            "Crawl executed in {:.3} minutes",
            self.elapsed().as_secs_f64() / 60.0
        );
    }
}

/// What a persisted run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub total_records: usize,
    pub categories: Vec<CategoryTally>,
    /// Human-readable location of the persisted records
    pub destination: String,
}

/// Main crawl coordinator
pub struct Coordinator {
    target: CrawlTarget,
    fetcher: Arc<Fetcher>,
    robots_agent: String,
    max_concurrent_categories: usize,
}

impl Coordinator {
    /// Creates a coordinator from a validated configuration
    pub fn new(config: &Config) -> Result<Self, TrawlError> {
        let fetcher = Fetcher::from_config(&config.fetch)?;
        tracing::debug!(
            "Fetcher ready: {} identities, {} attempts, {:?} timeout, {:?} backoff base",
            fetcher.user_agents().as_slice().len(),
            fetcher.policy().max_retries,
            fetcher.policy().timeout,
            fetcher.policy().backoff_base
        );
        Ok(Self::with_fetcher(
            CrawlTarget::new(config.target.base_url.as_str()),
            fetcher,
            config.robots.user_agent.clone(),
            config.crawler.max_concurrent_categories as usize,
        ))
    }

    /// Creates a coordinator around an already built fetcher
    pub fn with_fetcher(
        target: CrawlTarget,
        fetcher: Fetcher,
        robots_agent: impl Into<String>,
        max_concurrent_categories: usize,
    ) -> Self {
        Self {
            target,
            fetcher: Arc::new(fetcher),
            robots_agent: robots_agent.into(),
            max_concurrent_categories: max_concurrent_categories.max(1),
        }
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    /// Runs the crawl and returns the aggregate without persisting it
    pub async fn run(&self) -> Result<CrawlOutcome, TrawlError> {
        let _timer = RunTimer::start();
        tracing::info!("Starting crawl of {}", self.target.base_url);

        match self.execute().await {
            Ok(outcome) => {
                tracing::info!(
                    "Crawl completed: {} records across {} categories",
                    outcome.total_records,
                    outcome.categories.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("Crawl aborted: {}", e);
                Err(e)
            }
        }
    }

    /// Runs the crawl and hands the outcome to `store` exactly once
    ///
    /// The store is only touched after a successful run.
    pub async fn run_and_persist(
        &self,
        store: &mut dyn RecordStore,
    ) -> Result<RunReport, TrawlError> {
        let outcome = self.run().await?;

        let report = RunReport {
            total_records: outcome.total_records,
            categories: outcome.categories.clone(),
            destination: store.describe(),
        };

        store.persist(outcome)?;
        tracing::info!(
            "Persisted {} records to {}",
            report.total_records,
            report.destination
        );

        Ok(report)
    }

    async fn execute(&self) -> Result<CrawlOutcome, TrawlError> {
        check_allowed(&self.fetcher, &self.target.base_url, &self.robots_agent).await?;

        let categories = self.enumerate_categories().await?;

        let walks = if self.max_concurrent_categories > 1 && categories.len() > 1 {
            self.walk_concurrently(categories).await?
        } else {
            self.walk_sequentially(categories).await?
        };

        Ok(CrawlOutcome::aggregate(walks))
    }

    /// Fetches the listing-index page and extracts its categories
    pub async fn enumerate_categories(&self) -> Result<Vec<CategoryLink>, TrawlError> {
        let page = self.fetcher.fetch(&self.target.base_url).await?;

        let categories = extract_category_links(&page.body, &self.target.base_url)
            .map_err(|message| TrawlError::ParseShape {
                url: page.url.clone(),
                message,
            })?;

        tracing::info!("Found {} categories", categories.len());
        Ok(categories)
    }

    async fn walk_sequentially(
        &self,
        categories: Vec<CategoryLink>,
    ) -> Result<Vec<CategoryWalk>, TrawlError> {
        let mut walks = Vec::with_capacity(categories.len());

        for category in categories {
            let records = walk_category(&self.fetcher, &category).await?;
            walks.push((category.name, records));
        }

        Ok(walks)
    }

    /// Walks up to `max_concurrent_categories` categories at once
    ///
    /// Results are slotted back by discovery index, so the aggregate order
    /// matches the sequential walk. The first failure cancels every other
    /// walk still in flight.
    async fn walk_concurrently(
        &self,
        categories: Vec<CategoryLink>,
    ) -> Result<Vec<CategoryWalk>, TrawlError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_categories));
        let mut tasks = JoinSet::new();
        let count = categories.len();

        tracing::debug!(
            "Walking {} categories with up to {} in flight",
            count,
            self.max_concurrent_categories
        );

        for (index, category) in categories.into_iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| TrawlError::Task(e.to_string()))?;
                let records = walk_category(&fetcher, &category).await?;
                Ok::<_, TrawlError>((index, category.name, records))
            });
        }

        let mut slots: Vec<Option<CategoryWalk>> = (0..count).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            let walked = joined.map_err(|e| TrawlError::Task(e.to_string())).and_then(|r| r);

            match walked {
                Ok((index, name, records)) => slots[index] = Some((name, records)),
                Err(e) => {
                    tracing::error!("Category walk failed, cancelling the rest: {}", e);
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }
}

/// Walks one category page by page until no next-page pointer remains
///
/// Every record is tagged with the category's display name. A next-page
/// pointer back to a page already walked is a `ParseShape` error.
pub async fn walk_category(
    fetcher: &Fetcher,
    category: &CategoryLink,
) -> Result<Vec<ItemRecord>, TrawlError> {
    tracing::info!("Scraping category: {}", category.name);

    let mut records = Vec::new();
    let mut pages = 0usize;
    let mut visited = HashSet::new();
    let mut current = Some(category.url.clone());

    while let Some(url) = current {
        if !visited.insert(url.clone()) {
            return Err(TrawlError::ParseShape {
                url,
                message: format!("pagination of {} loops back to this page", category.name),
            });
        }

        let page = fetcher.fetch(&url).await?;
        let result = parse_listing_page(&page.body, &category.name, &url)
            .map_err(|message| TrawlError::ParseShape {
                url: url.clone(),
                message,
            })?;

        pages += 1;
        tracing::debug!(
            "{}: page {} ({}) gave {} records",
            category.name,
            pages,
            url,
            result.records.len()
        );

        records.extend(result.records);
        current = result.next_page_url;
    }

    tracing::info!(
        "Category {} done: {} records over {} pages",
        category.name,
        records.len(),
        pages
    );

    Ok(records)
}

/// Runs a complete crawl and persists the result
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `store` - Receives the records once the whole crawl has succeeded
///
/// # Example
///
/// ```no_run
/// use shelf_trawl::config::load_config;
/// use shelf_trawl::crawler::run_crawl;
/// use shelf_trawl::storage::JsonFileStore;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let mut store = JsonFileStore::new(&config.output.raw_path);
/// let report = run_crawl(&config, &mut store).await?;
/// println!("{} records", report.total_records);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    store: &mut dyn RecordStore,
) -> Result<RunReport, TrawlError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run_and_persist(store).await
}
