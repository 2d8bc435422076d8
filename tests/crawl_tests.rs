//! End-to-end crawl sessions
//!
//! These tests drive the real HTTP fetcher against a wiremock server and a
//! scratch SQLite database, covering the full seed -> fetch -> persist ->
//! resume cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use warren::config::CrawlOptions;
use warren::crawler::{Coordinator, CrawlJournal, HttpFetcher};
use warren::progress::{ProgressSink, StatsDelta};
use warren::storage::GraphStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Discards every update; integration tests assert against the store and
/// the journal instead.
struct NullSink;

impl ProgressSink for NullSink {
    fn update(&self, _delta: StatsDelta) {}
    fn stop(&self) {}
}

struct TestSession {
    server: MockServer,
    db_path: PathBuf,
    log_path: PathBuf,
    _dir: tempfile::TempDir,
}

impl TestSession {
    async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self {
            server: MockServer::start().await,
            db_path: dir.path().join("graph.db"),
            log_path: dir.path().join("crawler.log"),
            _dir: dir,
        }
    }

    /// Mounts an article page whose body links to the given paths.
    async fn mount_article(&self, article_path: &str, links: &[&str], body_words: &str) {
        let anchors: String = links
            .iter()
            .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
            .collect();
        let html = format!(
            r#"<html><body><div id="mw-content-text">{}{}</div></body></html>"#,
            body_words, anchors
        );

        Mock::given(method("GET"))
            .and(path(article_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html)
                    .insert_header("content-type", "text/html"),
            )
            .mount(&self.server)
            .await;
    }

    async fn mount_failure(&self, article_path: &str) {
        Mock::given(method("GET"))
            .and(path(article_path))
            .respond_with(ResponseTemplate::new(500))
            .mount(&self.server)
            .await;
    }

    fn coordinator(&self, options: CrawlOptions) -> Coordinator {
        let store = Arc::new(GraphStore::open(&self.db_path).expect("Failed to open store"));
        let fetcher =
            Arc::new(HttpFetcher::new(&self.server.uri()).expect("Failed to build fetcher"));
        let journal = Arc::new(CrawlJournal::open(&self.log_path).expect("Failed to open journal"));
        Coordinator::new(store, fetcher, Arc::new(NullSink), journal, options)
    }

    fn store(&self) -> GraphStore {
        GraphStore::open(&self.db_path).expect("Failed to reopen store")
    }

    fn journal_text(&self) -> String {
        std::fs::read_to_string(&self.log_path).unwrap_or_default()
    }
}

fn fast_options() -> CrawlOptions {
    CrawlOptions {
        pacing: Duration::ZERO,
        ..CrawlOptions::default()
    }
}

#[tokio::test]
async fn test_full_session_crawls_seed_and_children() {
    let session = TestSession::new().await;
    session
        .mount_article("/wiki/A", &["/wiki/B", "/wiki/C"], "alpha beta gamma")
        .await;
    session.mount_article("/wiki/B", &[], "one two").await;
    session.mount_article("/wiki/C", &[], "three four").await;

    let mut coordinator = session.coordinator(fast_options());
    coordinator
        .run(Some("/wiki/A".to_string()))
        .await
        .expect("Crawl failed");

    assert_eq!(coordinator.pages_crawled(), 3);

    let store = session.store();
    for page in ["/wiki/A", "/wiki/B", "/wiki/C"] {
        assert!(store.is_crawled(page).unwrap(), "{} should be crawled", page);
    }

    let edges = store.all_edges().unwrap();
    assert_eq!(edges.len(), 2);
    assert!(edges.iter().all(|e| e.from == "/wiki/A"));
}

#[tokio::test]
async fn test_word_count_and_out_links_are_persisted() {
    let session = TestSession::new().await;
    session
        .mount_article("/wiki/A", &["/wiki/B"], "five alphabetic words right here")
        .await;
    session.mount_article("/wiki/B", &[], "").await;

    let mut coordinator = session.coordinator(fast_options());
    coordinator.run(Some("/wiki/A".to_string())).await.unwrap();

    let metrics = session.store().page_metrics().unwrap();
    let a = metrics.iter().find(|m| m.url == "/wiki/A").unwrap();
    // Five body words plus the anchor text "/wiki/B" (not alphabetic)
    assert_eq!(a.word_count, Some(5));
    assert_eq!(a.out_links, Some(1));
}

#[tokio::test]
async fn test_invalid_links_never_become_edges() {
    let session = TestSession::new().await;
    session
        .mount_article(
            "/wiki/A",
            &[
                "/wiki/B",
                "/wiki/Category:Stuff",
                "/wiki/B#History",
                "/w/index.php?title=B",
            ],
            "words",
        )
        .await;
    session.mount_article("/wiki/B", &[], "").await;

    let mut coordinator = session.coordinator(fast_options());
    coordinator.run(Some("/wiki/A".to_string())).await.unwrap();

    let edges = session.store().all_edges().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, "/wiki/B");
}

#[tokio::test]
async fn test_topic_filter_prunes_links_at_extraction() {
    let session = TestSession::new().await;
    session
        .mount_article("/wiki/A", &["/wiki/Compiler", "/wiki/Gardening"], "intro")
        .await;
    session.mount_article("/wiki/Compiler", &[], "").await;

    let mut coordinator = session.coordinator(CrawlOptions {
        topics: vec!["compiler".to_string()],
        ..fast_options()
    });
    coordinator.run(Some("/wiki/A".to_string())).await.unwrap();

    let store = session.store();
    let edges = store.all_edges().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to, "/wiki/Compiler");
    assert!(!store.is_crawled("/wiki/Gardening").unwrap());
}

#[tokio::test]
async fn test_failing_seed_is_retried_then_dropped() {
    let session = TestSession::new().await;
    session.mount_failure("/wiki/Broken").await;

    let mut coordinator = session.coordinator(CrawlOptions {
        retry_limit: 2,
        ..fast_options()
    });
    coordinator
        .run(Some("/wiki/Broken".to_string()))
        .await
        .unwrap();

    assert_eq!(coordinator.pages_crawled(), 0);

    let store = session.store();
    assert!(!store.is_crawled("/wiki/Broken").unwrap());
    assert_eq!(store.all_edges().unwrap().len(), 0);

    let journal = session.journal_text();
    assert!(journal.contains("Giving up on /wiki/Broken after 2 attempts."));
    assert!(journal.contains("Crawl complete. Dashboard closed."));
}

#[tokio::test]
async fn test_second_session_resumes_from_uncrawled_page() {
    let session = TestSession::new().await;
    session
        .mount_article("/wiki/A", &["/wiki/B", "/wiki/C"], "start")
        .await;
    session.mount_article("/wiki/B", &[], "").await;
    session.mount_article("/wiki/C", &[], "").await;

    // First session crawls only the seed before hitting its budget
    let mut first = session.coordinator(CrawlOptions {
        limit: 1,
        ..fast_options()
    });
    first.run(Some("/wiki/A".to_string())).await.unwrap();
    assert_eq!(first.pages_crawled(), 1);

    // Second session has no explicit start; it must pick up an uncrawled
    // discovery from the store rather than the default seed
    let mut second = session.coordinator(CrawlOptions {
        limit: 1,
        ..fast_options()
    });
    second.run(None).await.unwrap();
    assert_eq!(second.pages_crawled(), 1);

    let store = session.store();
    let crawled = store.crawled_pages().unwrap();
    assert_eq!(crawled.len(), 2);
    assert!(crawled.contains(&"/wiki/A".to_string()));
    assert!(
        crawled.contains(&"/wiki/B".to_string()) || crawled.contains(&"/wiki/C".to_string())
    );
}

#[tokio::test]
async fn test_depth_zero_session_only_fetches_the_seed() {
    let session = TestSession::new().await;
    session
        .mount_article("/wiki/A", &["/wiki/B"], "surface")
        .await;

    // Depth 0 must record /wiki/B without ever requesting it
    Mock::given(method("GET"))
        .and(path("/wiki/B"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>deep</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .expect(0)
        .mount(&session.server)
        .await;

    let mut coordinator = session.coordinator(CrawlOptions {
        max_depth: 0,
        ..fast_options()
    });
    coordinator.run(Some("/wiki/A".to_string())).await.unwrap();

    assert_eq!(coordinator.pages_crawled(), 1);

    let store = session.store();
    assert!(store.is_crawled("/wiki/A").unwrap());
    assert!(!store.is_crawled("/wiki/B").unwrap());
    assert_eq!(store.all_edges().unwrap().len(), 1);
}
