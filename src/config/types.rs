use serde::Deserialize;

/// Browser identities rotated across fetch attempts when the config
/// does not supply its own pool
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0",
];

/// Main configuration structure for Shelf-Trawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub robots: RobotsConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The catalog site to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Root of the catalog; category hrefs are appended to it verbatim
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Retry, timeout and identity settings for page fetches
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Attempts per URL before giving up
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-attempt timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Backoff unit; the delay after attempt `n` is `base * 2^n` (milliseconds)
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Proxy URL routed for every scheme
    #[serde(default)]
    pub proxy: Option<String>,

    /// User-Agent pool, one entry picked at random per attempt
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            backoff_base_ms: default_backoff_base_ms(),
            proxy: None,
            user_agents: default_user_agents(),
        }
    }
}

/// robots.txt evaluation settings
#[derive(Debug, Clone, Deserialize)]
pub struct RobotsConfig {
    /// Agent name the policy is evaluated for
    #[serde(rename = "user-agent", default = "default_robots_agent")]
    pub user_agent: String,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            user_agent: default_robots_agent(),
        }
    }
}

/// Crawl controller behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of categories walked at the same time (1 = sequential)
    #[serde(
        rename = "max-concurrent-categories",
        default = "default_max_concurrent_categories"
    )]
    pub max_concurrent_categories: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_categories: default_max_concurrent_categories(),
        }
    }
}

/// Which record store receives the raw crawl output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Json,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Record store used for the raw records
    #[serde(default)]
    pub sink: SinkKind,

    /// Path to the raw JSON record file
    #[serde(rename = "raw-path", default = "default_raw_path")]
    pub raw_path: String,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Path to the cleaned CSV file
    #[serde(rename = "processed-path", default = "default_processed_path")]
    pub processed_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::default(),
            raw_path: default_raw_path(),
            database_path: default_database_path(),
            processed_path: default_processed_path(),
        }
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
}

fn default_robots_agent() -> String {
    "*".to_string()
}

fn default_max_concurrent_categories() -> u32 {
    1
}

fn default_raw_path() -> String {
    "data/raw/books.json".to_string()
}

fn default_database_path() -> String {
    "data/raw/books.db".to_string()
}

fn default_processed_path() -> String {
    "data/processed/books.csv".to_string()
}
