//! Graph export
//!
//! Read-only transformations over the persisted graph: edge-list JSON,
//! adjacency-map JSON, two-column CSV, and the crawled-page list. Edge
//! exports can be restricted to sources under a path prefix.

use crate::storage::{GraphStore, LinkEdge};
use crate::Result;
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Shape of the exported file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// JSON edge list: `[{"from": ..., "to": ...}, ...]`
    Edges,

    /// JSON adjacency map: `{ url: [targets...] }`
    Adjacency,

    /// CSV with a `from_url,to_url` header
    Csv,

    /// JSON array of crawled page paths
    Pages,
}

/// Writes the requested view of the graph to `output` and returns the
/// number of exported records.
pub fn export_graph(
    store: &GraphStore,
    format: ExportFormat,
    prefix: Option<&str>,
    output: &Path,
) -> Result<usize> {
    let edges = |store: &GraphStore| match prefix {
        Some(prefix) => store.edges_from_prefix(prefix),
        None => store.all_edges(),
    };

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);

    let count = match format {
        ExportFormat::Edges => {
            let edges = edges(store)?;
            serde_json::to_writer_pretty(&mut writer, &edges)?;
            edges.len()
        }
        ExportFormat::Adjacency => {
            let adjacency = adjacency_map(&edges(store)?);
            let count = adjacency.values().map(Vec::len).sum();
            serde_json::to_writer_pretty(&mut writer, &adjacency)?;
            count
        }
        ExportFormat::Csv => {
            let edges = edges(store)?;
            writeln!(writer, "from_url,to_url")?;
            for edge in &edges {
                writeln!(writer, "{},{}", edge.from, edge.to)?;
            }
            edges.len()
        }
        ExportFormat::Pages => {
            let pages = store.crawled_pages()?;
            serde_json::to_writer_pretty(&mut writer, &pages)?;
            pages.len()
        }
    };

    writer.flush()?;
    Ok(count)
}

fn adjacency_map(edges: &[LinkEdge]) -> BTreeMap<String, Vec<String>> {
    let mut adjacency: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for edge in edges {
        adjacency
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
    }
    adjacency
}
