//! Crawler module: the BFS engine and its collaborators
//!
//! The coordinator owns the session state machine; fetching, parsing, the
//! retry queue, and the session log live alongside it as the collaborators
//! it drives.

mod coordinator;
mod fetcher;
mod journal;
mod parser;
mod retry;

pub use coordinator::{Coordinator, FrontierEntry};
pub use fetcher::{Fetch, FetchOutcome, HttpFetcher};
pub use journal::CrawlJournal;
pub use parser::{is_valid_article_link, matches_topic, parse_article, ParsedArticle};
pub use retry::{RetryEntry, RetryQueue};

use crate::config::{CrawlOptions, BASE_URL};
use crate::progress::ProgressLogger;
use crate::storage::GraphStore;
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Runs one crawl session with the production fetcher and progress sink.
///
/// Opens (or creates) the store at `db_path`, appends to the session log at
/// `logfile`, and crawls until the page budget or the queues are exhausted.
pub async fn crawl(
    options: CrawlOptions,
    start: Option<String>,
    db_path: &Path,
    logfile: &Path,
) -> Result<u64> {
    let store = Arc::new(GraphStore::open(db_path)?);
    let fetcher = Arc::new(HttpFetcher::new(BASE_URL)?);
    let progress = Arc::new(ProgressLogger::start());
    let journal = Arc::new(CrawlJournal::open(logfile)?);

    let mut coordinator = Coordinator::new(store, fetcher, progress, journal, options);
    coordinator.run(start).await?;

    Ok(coordinator.pages_crawled())
}
