//! Crawl constants and per-session options
//!
//! Warren is configured through CLI flags plus one environment variable for
//! the database location; the constants here are the defaults those flags
//! fall back to.

use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the encyclopedia being mapped
pub const BASE_URL: &str = "https://en.wikipedia.org";

/// Seed used when the store has no uncrawled candidate to resume from
pub const DEFAULT_START_PATH: &str = "/wiki/Web_crawler";

/// Default worker pool size per batch
pub const MAX_WORKERS: usize = 10;

/// Delay between successive batches and between retry attempts
pub const SLEEP_TIME: Duration = Duration::from_millis(100);

/// Failed retry attempts before a URL is dropped for the session
pub const RETRY_ATTEMPTS: u32 = 2;

/// Per-request fetch timeout
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default pages-per-session budget
pub const MAX_SESSION_PAGES: u64 = 100;

/// Default database file, next to the working directory
pub const DEFAULT_DB_PATH: &str = "wiki_links.db";

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "WIKI_CRAWLER_DB";

/// Resolves the database path from the environment, falling back to the
/// default local file.
pub fn db_path() -> PathBuf {
    std::env::var(DB_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DB_PATH))
}

/// Parses a comma-separated topic list into lowercase filter substrings.
///
/// Empty segments are discarded, so `""` yields no filters (match all).
pub fn parse_topics(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Options for one crawl session
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum pages crawled this session
    pub limit: u64,

    /// Maximum BFS depth from the seed; negative means unlimited
    pub max_depth: i64,

    /// Lowercase topic filter substrings; empty matches everything
    pub topics: Vec<String>,

    /// Log each parent -> children expansion
    pub enumerate: bool,

    /// Upper bound on concurrent fetches per batch
    pub workers: usize,

    /// Pause between batches and between retry attempts
    pub pacing: Duration,

    /// Failed retry attempts before giving a URL up
    pub retry_limit: u32,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            limit: MAX_SESSION_PAGES,
            max_depth: -1,
            topics: Vec::new(),
            enumerate: false,
            workers: MAX_WORKERS,
            pacing: SLEEP_TIME,
            retry_limit: RETRY_ATTEMPTS,
        }
    }
}
