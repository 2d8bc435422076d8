//! Warren: a resumable breadth-first mapper of the Wikipedia link graph
//!
//! This crate implements a crawler that discovers and persists the directed
//! link graph of a single encyclopedia site. Sessions are bounded by a page
//! budget and can be resumed across process runs from the persisted store.

pub mod config;
pub mod crawler;
pub mod output;
pub mod progress;
pub mod storage;

use thiserror::Error;

/// Main error type for Warren operations
#[derive(Debug, Error)]
pub enum WarrenError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type alias for Warren operations
pub type Result<T> = std::result::Result<T, WarrenError>;

// Re-export commonly used types
pub use config::CrawlOptions;
pub use crawler::{Coordinator, Fetch, FetchOutcome, HttpFetcher};
pub use progress::{ProgressLogger, ProgressSink, StatsDelta};
pub use storage::GraphStore;
