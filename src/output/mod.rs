//! Read-only views over the persisted graph
//!
//! Export, analytics, and the status summary are all simple
//! transformations of the store; none of them touch crawl state.

mod analyze;
mod export;

pub use analyze::{analyze_graph, print_report, GraphReport, RabbitHole};
pub use export::{export_graph, ExportFormat};

use crate::storage::GraphStore;
use crate::Result;

/// Snapshot of the store's crawl progress
#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub total_pages: u64,
    pub crawled_pages: u64,
    pub total_links: u64,
}

impl StoreStatus {
    pub fn remaining(&self) -> u64 {
        self.total_pages - self.crawled_pages
    }
}

/// Loads the status counters from the store.
pub fn load_status(store: &GraphStore) -> Result<StoreStatus> {
    Ok(StoreStatus {
        total_pages: store.count_pages()?,
        crawled_pages: store.count_crawled()?,
        total_links: store.count_links()?,
    })
}

/// Prints the status summary to stdout.
pub fn print_status(status: &StoreStatus) {
    println!("Crawler Status");
    println!("----------------------------");
    println!("Total pages discovered : {}", status.total_pages);
    println!("Pages crawled          : {}", status.crawled_pages);
    println!("Pages remaining        : {}", status.remaining());
    println!("Total link relationships: {}", status.total_links);
    println!("----------------------------");
    if status.remaining() == 0 {
        println!("All discovered pages have been crawled.");
    } else {
        println!("Crawl in progress.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GraphStore;

    #[test]
    fn test_status_counters() {
        let store = GraphStore::open_in_memory().unwrap();
        store
            .record_links("/wiki/A", &["/wiki/B".to_string(), "/wiki/C".to_string()])
            .unwrap();
        store.upsert_seed("/wiki/A", false).unwrap();
        store.mark_crawled("/wiki/A").unwrap();

        let status = load_status(&store).unwrap();
        assert_eq!(status.total_pages, 3);
        assert_eq!(status.crawled_pages, 1);
        assert_eq!(status.remaining(), 2);
        assert_eq!(status.total_links, 2);
    }
}
