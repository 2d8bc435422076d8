//! Storage module for the persisted link graph
//!
//! The SQLite store is the single source of truth for which pages have been
//! crawled and which edges exist. Frontier and retry state are deliberately
//! not persisted; a resumed session reconstructs its seed by querying for
//! the next uncrawled page.

mod schema;
mod sqlite;

pub use schema::{ensure_schema, SCHEMA_SQL};
pub use sqlite::GraphStore;

use crate::Result;
use serde::Serialize;
use std::path::Path;

/// A directed edge of the link graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEdge {
    pub from: String,
    pub to: String,
}

/// Per-page annotations used by the analytics pass
#[derive(Debug, Clone)]
pub struct PageMetrics {
    pub url: String,
    pub word_count: Option<i64>,
    pub out_links: Option<i64>,
}

/// Opens (or creates) the graph store at the given path
pub fn open_store(path: &Path) -> Result<GraphStore> {
    GraphStore::open(path)
}
