//! Database schema definition and migration
//!
//! Two tables hold the whole persisted graph: `pages` keyed by canonical
//! path, and `links` keyed by the (from, to) pair.

use rusqlite::Connection;

/// SQL schema for the link graph database
pub const SCHEMA_SQL: &str = r#"
-- Every discovered page, keyed by its canonical path
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    crawled INTEGER NOT NULL DEFAULT 0,
    word_count INTEGER,
    out_links INTEGER
);

CREATE INDEX IF NOT EXISTS idx_pages_crawled ON pages(crawled);

-- Directed edges, recorded at most once per pair
CREATE TABLE IF NOT EXISTS links (
    from_url TEXT NOT NULL,
    to_url TEXT NOT NULL,
    PRIMARY KEY (from_url, to_url)
);

CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_url);
"#;

/// Creates the schema if absent and migrates old databases forward.
///
/// Safe to run on every open. Databases written before the metrics columns
/// existed gain `word_count` and `out_links` in place.
pub fn ensure_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;

    if !column_exists(conn, "pages", "word_count")? {
        conn.execute("ALTER TABLE pages ADD COLUMN word_count INTEGER", [])?;
    }
    if !column_exists(conn, "pages", "out_links")? {
        conn.execute("ALTER TABLE pages ADD COLUMN out_links INTEGER", [])?;
    }

    Ok(())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
