//! Append-only crawl log
//!
//! Every fetch attempt, result, give-up, and completion event lands here as
//! one timestamp-prefixed line, mirrored to tracing. The file is the
//! durable record of what a session did; tracing is the live view.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Timestamped, append-only session log file
pub struct CrawlJournal {
    file: Mutex<File>,
}

impl CrawlJournal {
    /// Opens the log file for appending, creating it if absent.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one `[timestamp] message` line and mirrors it to tracing.
    ///
    /// A failed append must not abort the crawl; it is reported and the
    /// session continues.
    pub fn line(&self, message: &str) {
        tracing::info!("{}", message);

        let stamped = format!(
            "[{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        let mut file = self.file.lock().unwrap();
        if let Err(e) = writeln!(file, "{}", stamped) {
            tracing::warn!("Failed to append to crawl log: {}", e);
        }
    }
}
