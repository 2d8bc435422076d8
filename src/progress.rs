//! Crawl progress reporting
//!
//! The scheduler emits counter updates through the `ProgressSink` trait and
//! never owns presentation. `ProgressLogger` is the production sink: atomic
//! counters plus a background refresh thread that renders a one-line
//! summary once per second. `update` costs a handful of atomic stores and
//! never blocks the caller.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// One batch of counter changes from the scheduler
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsDelta {
    /// Pages crawled since the last update
    pub crawled: u64,

    /// Failed fetches since the last update
    pub failed: u64,

    /// Retry attempts consumed since the last update
    pub retries: u64,

    /// Absolute size of the frontier plus the in-flight batch, when known
    pub queued: Option<u64>,

    /// BFS depth of a completed page, when one completed
    pub depth: Option<u32>,
}

/// Sink for scheduler counter updates
pub trait ProgressSink: Send + Sync {
    /// Records an update; must not block beyond bookkeeping.
    fn update(&self, delta: StatsDelta);

    /// Stops the sink; called exactly once during teardown.
    fn stop(&self);
}

#[derive(Default)]
struct Counters {
    crawled: AtomicU64,
    queued: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
    max_depth_seen: AtomicU32,
}

/// Production sink: renders a progress line via tracing once per second
pub struct ProgressLogger {
    counters: Arc<Counters>,
    running: Arc<AtomicBool>,
    renderer: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressLogger {
    /// Starts the logger and its background refresh thread.
    pub fn start() -> Self {
        let counters = Arc::new(Counters::default());
        let running = Arc::new(AtomicBool::new(true));

        let render_counters = Arc::clone(&counters);
        let render_running = Arc::clone(&running);
        let started = Instant::now();

        let renderer = std::thread::spawn(move || {
            while render_running.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_secs(1));
                if !render_running.load(Ordering::Relaxed) {
                    break;
                }
                let elapsed = started.elapsed().as_secs();
                tracing::info!(
                    crawled = render_counters.crawled.load(Ordering::Relaxed),
                    queued = render_counters.queued.load(Ordering::Relaxed),
                    failed = render_counters.failed.load(Ordering::Relaxed),
                    retries = render_counters.retries.load(Ordering::Relaxed),
                    max_depth = render_counters.max_depth_seen.load(Ordering::Relaxed),
                    elapsed_secs = elapsed,
                    "crawl progress"
                );
            }
        });

        Self {
            counters,
            running,
            renderer: Mutex::new(Some(renderer)),
        }
    }

    fn apply(&self, delta: StatsDelta) {
        self.counters.crawled.fetch_add(delta.crawled, Ordering::Relaxed);
        self.counters.failed.fetch_add(delta.failed, Ordering::Relaxed);
        self.counters.retries.fetch_add(delta.retries, Ordering::Relaxed);
        if let Some(queued) = delta.queued {
            self.counters.queued.store(queued, Ordering::Relaxed);
        }
        if let Some(depth) = delta.depth {
            self.counters.max_depth_seen.fetch_max(depth, Ordering::Relaxed);
        }
    }

    /// Snapshot of the crawled counter, mainly for the final summary.
    pub fn crawled(&self) -> u64 {
        self.counters.crawled.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressLogger {
    fn update(&self, delta: StatsDelta) {
        self.apply(delta);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.renderer.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}
