//! The BFS crawl engine
//!
//! One coordinating control flow runs the session state machine: seed the
//! frontier, dispatch bounded batches to the worker pool, interpret results
//! in completion order, drain the retry queue sequentially, then tear down.
//! The store is the only resource the concurrent completion handlers touch,
//! and it serializes internally, so the coordinator needs no locking of its
//! own.

use crate::config::{CrawlOptions, DEFAULT_START_PATH};
use crate::crawler::fetcher::{Fetch, FetchOutcome};
use crate::crawler::journal::CrawlJournal;
use crate::crawler::retry::{RetryEntry, RetryQueue};
use crate::progress::{ProgressSink, StatsDelta};
use crate::storage::GraphStore;
use crate::Result;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A not-yet-fetched page and its BFS distance from the seed
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub path: String,
    pub depth: u32,
}

/// BFS orchestrator for one crawl session
pub struct Coordinator {
    store: Arc<GraphStore>,
    fetcher: Arc<dyn Fetch>,
    progress: Arc<dyn ProgressSink>,
    journal: Arc<CrawlJournal>,
    options: CrawlOptions,
    frontier: VecDeque<FrontierEntry>,
    retries: RetryQueue,
    session_crawled: u64,
}

impl Coordinator {
    pub fn new(
        store: Arc<GraphStore>,
        fetcher: Arc<dyn Fetch>,
        progress: Arc<dyn ProgressSink>,
        journal: Arc<CrawlJournal>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            store,
            fetcher,
            progress,
            journal,
            options,
            frontier: VecDeque::new(),
            retries: RetryQueue::new(),
            session_crawled: 0,
        }
    }

    /// Pages crawled by this session so far
    pub fn pages_crawled(&self) -> u64 {
        self.session_crawled
    }

    /// Runs one crawl session to completion.
    ///
    /// Teardown (stopping the stats sink and writing the completion line)
    /// runs on every exit path, including storage errors.
    pub async fn run(&mut self, start: Option<String>) -> Result<()> {
        let result = self.session(start).await;

        self.progress.stop();
        self.journal.line("Crawl complete. Dashboard closed.");

        result
    }

    async fn session(&mut self, start: Option<String>) -> Result<()> {
        self.seed(start)?;

        while !self.frontier.is_empty() && self.session_crawled < self.options.limit {
            let batch = self.next_batch()?;
            self.progress.update(StatsDelta {
                queued: Some((self.frontier.len() + batch.len()) as u64),
                ..Default::default()
            });

            self.dispatch_batch(batch).await?;
            tokio::time::sleep(self.options.pacing).await;
        }

        self.drain_retries().await
    }

    /// Picks the session's starting point: the caller-supplied path, an
    /// uncrawled page from the store, or the hard-coded default seed. The
    /// seed is force-inserted so an explicitly reseeded page is crawled
    /// again.
    fn seed(&mut self, start: Option<String>) -> Result<()> {
        let start = match start {
            Some(path) => path,
            None => match self.store.find_next_uncrawled(&self.options.topics)? {
                Some(path) => path,
                None => {
                    self.journal
                        .line("No uncrawled pages in store. Starting from default seed.");
                    DEFAULT_START_PATH.to_string()
                }
            },
        };

        if self.options.topics.is_empty() {
            self.journal.line("No topic filtering applied");
        } else {
            self.journal.line(&format!(
                "Filtering links by topics: {}",
                self.options.topics.join(", ")
            ));
        }

        self.store.upsert_seed(&start, true)?;
        self.frontier.push_back(FrontierEntry {
            path: start,
            depth: 0,
        });

        Ok(())
    }

    /// Pops up to `workers` frontier entries in FIFO order, dropping any
    /// that exceed the depth bound, are already crawled, or duplicate a
    /// path already in this batch. Dropped entries are never re-enqueued;
    /// a crawled duplicate carries no new information.
    fn next_batch(&mut self) -> Result<Vec<FrontierEntry>> {
        let mut batch = Vec::new();
        let mut in_batch = HashSet::new();

        while batch.len() < self.options.workers {
            let Some(entry) = self.frontier.pop_front() else {
                break;
            };

            if self.options.max_depth >= 0 && i64::from(entry.depth) > self.options.max_depth {
                continue;
            }
            if !in_batch.insert(entry.path.clone()) {
                continue;
            }
            if self.store.is_crawled(&entry.path)? {
                continue;
            }

            batch.push(entry);
        }

        Ok(batch)
    }

    /// Fetches a batch concurrently, one worker task per entry, and
    /// consumes results in completion order. The batch is fully drained
    /// before the caller dispatches the next one.
    async fn dispatch_batch(&mut self, batch: Vec<FrontierEntry>) -> Result<()> {
        let mut inflight = JoinSet::new();

        for entry in batch {
            self.journal.line(&format!("Fetching: {}", entry.path));

            let fetcher = Arc::clone(&self.fetcher);
            let topics = self.options.topics.clone();
            inflight.spawn(async move {
                let outcome = fetcher.fetch(&entry.path, &topics).await;
                (entry, outcome)
            });
        }

        while let Some(joined) = inflight.join_next().await {
            let (entry, outcome) = joined?;

            if outcome.success {
                self.record_success(&entry.path, entry.depth, entry.depth + 1, &outcome, false)?;
            } else {
                self.journal.line(&format!("Failed to fetch {}", entry.path));
                self.retries.push(RetryEntry {
                    path: entry.path,
                    attempts: 0,
                });
                self.progress.update(StatsDelta {
                    failed: 1,
                    ..Default::default()
                });
            }
        }

        Ok(())
    }

    /// Drains the retry queue strictly sequentially once the primary loop
    /// has exited, so a host already known to be failing is never hit
    /// concurrently. Children of a successful retry enter the frontier at
    /// fixed depth 1.
    async fn drain_retries(&mut self) -> Result<()> {
        while self.session_crawled < self.options.limit {
            let Some(RetryEntry { path, attempts }) = self.retries.pop() else {
                break;
            };

            if attempts >= self.options.retry_limit {
                self.journal.line(&format!(
                    "Giving up on {} after {} attempts.",
                    path, self.options.retry_limit
                ));
                continue;
            }

            self.journal.line(&format!("Fetching: {}", path));
            let outcome = self.fetcher.fetch(&path, &self.options.topics).await;

            if outcome.success {
                self.record_success(&path, 1, 1, &outcome, true)?;
            } else {
                self.journal.line(&format!("Failed to fetch {}", path));
                self.retries.push(RetryEntry {
                    path,
                    attempts: attempts + 1,
                });
                self.progress.update(StatsDelta {
                    failed: 1,
                    retries: 1,
                    ..Default::default()
                });
            }

            tokio::time::sleep(self.options.pacing).await;
        }

        Ok(())
    }

    /// Writes one successful fetch into the store, bumps the session
    /// counter, reports stats, and enqueues the children.
    fn record_success(
        &mut self,
        path: &str,
        stats_depth: u32,
        child_depth: u32,
        outcome: &FetchOutcome,
        retry: bool,
    ) -> Result<()> {
        self.store.record_links(path, &outcome.links)?;
        self.store.mark_crawled(path)?;
        self.store
            .set_page_metrics(path, outcome.word_count, outcome.links.len())?;

        self.session_crawled += 1;
        self.progress.update(StatsDelta {
            crawled: 1,
            depth: Some(stats_depth),
            ..Default::default()
        });

        if retry {
            self.journal.line(&format!(
                "Retry succeeded: {} -> {} links",
                path,
                outcome.links.len()
            ));
        } else {
            self.journal.line(&format!(
                "Crawled {} -> {} topic-matched links",
                path,
                outcome.links.len()
            ));
        }

        if self.options.enumerate {
            self.journal
                .line(&format!("[Depth {}] Parent: {}", stats_depth, path));
            for child in &outcome.links {
                self.journal.line(&format!("  └─ {}", child));
            }
        }

        for link in &outcome.links {
            self.frontier.push_back(FrontierEntry {
                path: link.clone(),
                depth: child_depth,
            });
        }

        Ok(())
    }
}
