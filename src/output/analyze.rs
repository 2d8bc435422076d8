//! Post-hoc graph analytics
//!
//! Aggregate degree statistics plus the rabbit-hole ranking: a per-page
//! "depth of interest" score combining log-scaled word count, out-degree,
//! average neighbor out-degree, and in-degree with fixed weights.

use crate::storage::GraphStore;
use crate::Result;
use std::collections::{BTreeSet, HashMap};

/// One scored page of the rabbit-hole ranking
#[derive(Debug, Clone)]
pub struct RabbitHole {
    pub url: String,
    pub score: f64,
    pub words: i64,
    pub out_degree: usize,
    pub in_degree: usize,
}

/// Aggregate statistics over the persisted graph
#[derive(Debug, Clone)]
pub struct GraphReport {
    pub nodes: usize,
    pub edges: usize,
    pub avg_out_degree: f64,
    pub avg_in_degree: f64,
    pub top_by_out_degree: Vec<(String, usize)>,
    pub rabbit_holes: Vec<RabbitHole>,
}

/// Builds the full analytics report, keeping the `top` best entries of each
/// ranking.
pub fn analyze_graph(store: &GraphStore, top: usize) -> Result<GraphReport> {
    let edges = store.all_edges()?;

    let mut out_degree: HashMap<String, usize> = HashMap::new();
    let mut in_degree: HashMap<String, usize> = HashMap::new();
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();

    for edge in &edges {
        *out_degree.entry(edge.from.clone()).or_default() += 1;
        *in_degree.entry(edge.to.clone()).or_default() += 1;
        adjacency
            .entry(edge.from.clone())
            .or_default()
            .push(edge.to.clone());
    }

    let word_counts: HashMap<String, i64> = store
        .page_metrics()?
        .into_iter()
        .map(|m| (m.url, m.word_count.unwrap_or(0)))
        .collect();

    // Averaged over nodes that have the respective degree
    let avg_out_degree = if out_degree.is_empty() {
        0.0
    } else {
        edges.len() as f64 / out_degree.len() as f64
    };
    let avg_in_degree = if in_degree.is_empty() {
        0.0
    } else {
        edges.len() as f64 / in_degree.len() as f64
    };

    let mut top_by_out_degree: Vec<(String, usize)> = out_degree
        .iter()
        .map(|(url, degree)| (url.clone(), *degree))
        .collect();
    top_by_out_degree.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top_by_out_degree.truncate(top);

    // Every node the crawl knows about, whether it linked, was linked to,
    // or only carries metrics
    let all_nodes: BTreeSet<String> = out_degree
        .keys()
        .chain(in_degree.keys())
        .chain(word_counts.keys())
        .cloned()
        .collect();

    let mut rabbit_holes: Vec<RabbitHole> = all_nodes
        .iter()
        .map(|url| {
            let words = word_counts.get(url).copied().unwrap_or(0);
            let out = out_degree.get(url).copied().unwrap_or(0);
            let inbound = in_degree.get(url).copied().unwrap_or(0);
            let neighbors = adjacency.get(url);

            let avg_neighbor_out = match neighbors {
                Some(neighbors) if !neighbors.is_empty() => {
                    let total: usize = neighbors
                        .iter()
                        .map(|n| out_degree.get(n).copied().unwrap_or(0))
                        .sum();
                    total as f64 / neighbors.len() as f64
                }
                _ => 0.0,
            };

            RabbitHole {
                url: url.clone(),
                score: rabbit_hole_score(words, out, avg_neighbor_out, inbound),
                words,
                out_degree: out,
                in_degree: inbound,
            }
        })
        .collect();

    rabbit_holes.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.url.cmp(&b.url))
    });
    rabbit_holes.truncate(top);

    let nodes = out_degree
        .keys()
        .chain(in_degree.keys())
        .collect::<BTreeSet<_>>()
        .len();

    Ok(GraphReport {
        nodes,
        edges: edges.len(),
        avg_out_degree,
        avg_in_degree,
        top_by_out_degree,
        rabbit_holes,
    })
}

/// Fixed-weight combination of the four log-scaled signals.
fn rabbit_hole_score(words: i64, out_degree: usize, avg_neighbor_out: f64, in_degree: usize) -> f64 {
    0.40 * (words.max(0) as f64).ln_1p()
        + 0.30 * (out_degree as f64).ln_1p()
        + 0.20 * avg_neighbor_out.ln_1p()
        + 0.10 * (in_degree as f64).ln_1p()
}

/// Prints the report in the CLI's plain-text layout.
pub fn print_report(report: &GraphReport) {
    println!("Link Graph Stats");
    println!("  Nodes: {}", report.nodes);
    println!("  Links (edges): {}", report.edges);
    println!("  Average out-degree: {:.2}", report.avg_out_degree);
    println!("  Average in-degree: {:.2}", report.avg_in_degree);

    println!("\nTop pages by outbound links:");
    for (url, degree) in &report.top_by_out_degree {
        println!("  - {} -> {} links", url, degree);
    }

    println!("\nTop rabbit-hole pages:");
    for hole in &report.rabbit_holes {
        println!(
            "  - {}  score={:.3}  (words={}, out={}, in={})",
            hole.url, hole.score, hole.words, hole.out_degree, hole.in_degree
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::GraphStore;

    fn store_with_hub() -> GraphStore {
        let store = GraphStore::open_in_memory().unwrap();
        store
            .record_links(
                "/wiki/Hub",
                &[
                    "/wiki/A".to_string(),
                    "/wiki/B".to_string(),
                    "/wiki/C".to_string(),
                ],
            )
            .unwrap();
        store
            .record_links("/wiki/A", &["/wiki/B".to_string()])
            .unwrap();
        store.set_page_metrics("/wiki/Hub", 5000, 3).unwrap();
        store.set_page_metrics("/wiki/A", 10, 1).unwrap();
        store
    }

    #[test]
    fn test_degree_statistics() {
        let store = store_with_hub();
        let report = analyze_graph(&store, 10).unwrap();

        assert_eq!(report.nodes, 4);
        assert_eq!(report.edges, 4);
        // 4 edges over 2 nodes with outbound links
        assert!((report.avg_out_degree - 2.0).abs() < 1e-9);
        // 4 edges over 3 nodes with inbound links
        assert!((report.avg_in_degree - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_out_degree_ranking() {
        let store = store_with_hub();
        let report = analyze_graph(&store, 1).unwrap();

        assert_eq!(report.top_by_out_degree.len(), 1);
        assert_eq!(report.top_by_out_degree[0], ("/wiki/Hub".to_string(), 3));
    }

    #[test]
    fn test_rabbit_hole_prefers_wordy_hub() {
        let store = store_with_hub();
        let report = analyze_graph(&store, 10).unwrap();

        assert_eq!(report.rabbit_holes[0].url, "/wiki/Hub");
        assert!(report.rabbit_holes[0].score > report.rabbit_holes[1].score);
    }

    #[test]
    fn test_score_weights() {
        // words=e-1 makes ln_1p(words) exactly 1, and so on for each term
        let score = rabbit_hole_score(0, 0, 0.0, 0);
        assert!(score.abs() < 1e-12);

        let wordy = rabbit_hole_score(100, 0, 0.0, 0);
        let linky = rabbit_hole_score(0, 100, 0.0, 0);
        // Word count carries more weight than out-degree at equal magnitude
        assert!(wordy > linky);
    }

    #[test]
    fn test_empty_graph_report() {
        let store = GraphStore::open_in_memory().unwrap();
        let report = analyze_graph(&store, 5).unwrap();

        assert_eq!(report.nodes, 0);
        assert_eq!(report.edges, 0);
        assert_eq!(report.avg_out_degree, 0.0);
        assert!(report.rabbit_holes.is_empty());
    }
}
