//! SQLite-backed graph store
//!
//! One connection guarded by a mutex: every operation is a short,
//! self-contained transaction, and serializing access at the connection
//! makes each of them safe to call from concurrent completion handlers.
//! All writes are insert-if-absent or flag-set, so repeated calls are
//! no-ops.

use crate::storage::schema::ensure_schema;
use crate::storage::{LinkEdge, PageMetrics};
use crate::Result;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Durable key-value store for pages and links
pub struct GraphStore {
    conn: Mutex<Connection>,
}

impl GraphStore {
    /// Opens the database at `path`, creating and migrating the schema as
    /// needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        ensure_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Inserts a page row if absent. With `force_reset`, an existing row's
    /// crawled flag is pushed back to false; used only for explicit
    /// reseeding, never as part of normal discovery.
    pub fn upsert_seed(&self, url: &str, force_reset: bool) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        if force_reset {
            conn.execute(
                "INSERT OR REPLACE INTO pages (url, crawled) VALUES (?1, 0)",
                params![url],
            )?;
        } else {
            conn.execute(
                "INSERT OR IGNORE INTO pages (url, crawled) VALUES (?1, 0)",
                params![url],
            )?;
        }
        Ok(())
    }

    /// Ensures every target exists as an uncrawled page row and every
    /// `(from, to)` edge exists, in one transaction. Duplicate calls are
    /// no-ops.
    pub fn record_links(&self, from: &str, targets: &[String]) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut insert_page = tx.prepare_cached(
                "INSERT OR IGNORE INTO pages (url, crawled) VALUES (?1, 0)",
            )?;
            let mut insert_link = tx.prepare_cached(
                "INSERT OR IGNORE INTO links (from_url, to_url) VALUES (?1, ?2)",
            )?;
            for target in targets {
                insert_page.execute(params![target])?;
                insert_link.execute(params![from, target])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Sets the crawled flag; idempotent, and the flag never reverts.
    pub fn mark_crawled(&self, url: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE pages SET crawled = 1 WHERE url = ?1",
            params![url],
        )?;
        Ok(())
    }

    /// An absent URL reads as not crawled.
    pub fn is_crawled(&self, url: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let crawled: Option<i64> = conn
            .query_row(
                "SELECT crawled FROM pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(crawled == Some(1))
    }

    /// Returns an uncrawled page whose path contains at least one of the
    /// given lowercase substrings (case-insensitive), or any uncrawled page
    /// when no filters are given. Used only at session start, to resume.
    pub fn find_next_uncrawled(&self, topics: &[String]) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();

        if topics.is_empty() {
            let url = conn
                .query_row("SELECT url FROM pages WHERE crawled = 0 LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            return Ok(url);
        }

        let conditions = topics
            .iter()
            .map(|_| "url LIKE ?")
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT url FROM pages WHERE crawled = 0 AND ({}) LIMIT 1",
            conditions
        );
        let patterns = topics.iter().map(|t| format!("%{}%", t.to_lowercase()));

        let url = conn
            .query_row(&sql, params_from_iter(patterns), |row| row.get(0))
            .optional()?;
        Ok(url)
    }

    /// Best-effort page annotation, independent of crawl and link writes.
    pub fn set_page_metrics(&self, url: &str, word_count: usize, out_links: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE pages SET word_count = ?1, out_links = ?2 WHERE url = ?3",
            params![word_count as i64, out_links as i64, url],
        )?;
        Ok(())
    }

    /// Full edge materialization for export and analysis.
    pub fn all_edges(&self) -> Result<Vec<LinkEdge>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT from_url, to_url FROM links")?;
        let edges = stmt
            .query_map([], |row| {
                Ok(LinkEdge {
                    from: row.get(0)?,
                    to: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    /// Edges whose source path starts with `prefix`.
    pub fn edges_from_prefix(&self, prefix: &str) -> Result<Vec<LinkEdge>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT from_url, to_url FROM links WHERE from_url LIKE ?1")?;
        let edges = stmt
            .query_map(params![format!("{}%", prefix)], |row| {
                Ok(LinkEdge {
                    from: row.get(0)?,
                    to: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    /// Paths of all pages that have been crawled.
    pub fn crawled_pages(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT url FROM pages WHERE crawled = 1")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(urls)
    }

    /// Per-page metric rows for the analytics pass.
    pub fn page_metrics(&self) -> Result<Vec<PageMetrics>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT url, word_count, out_links FROM pages")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PageMetrics {
                    url: row.get(0)?,
                    word_count: row.get(1)?,
                    out_links: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_pages(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_crawled(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE crawled = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    pub fn count_links(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
