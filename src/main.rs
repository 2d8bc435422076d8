//! Warren command-line interface
//!
//! Three subcommands over one SQLite store: `crawl` runs a resumable BFS
//! session, `export` and `analyze` are read-only views of the persisted
//! graph, and `status` summarizes crawl progress.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use warren::config::{self, CrawlOptions};
use warren::output::{self, ExportFormat};
use warren::storage::open_store;

#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(version)]
#[command(about = "Map the Wikipedia link graph with a resumable BFS crawl", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start or resume a crawl session
    Crawl {
        /// Max pages to crawl this session
        #[arg(long, default_value_t = config::MAX_SESSION_PAGES)]
        limit: u64,

        /// Path to the append-only session log
        #[arg(long, default_value = "crawler.log")]
        logfile: PathBuf,

        /// Maximum crawl depth from the seed; -1 means unlimited
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        depth: i64,

        /// Comma-separated topic keywords to filter links
        #[arg(long, default_value = "")]
        topics: String,

        /// Log each parent -> children expansion
        #[arg(long)]
        enumerate: bool,

        /// Override the worker pool size
        #[arg(long, default_value_t = config::MAX_WORKERS)]
        workers: usize,

        /// Explicit seed path (e.g. /wiki/Web_crawler); overrides resume
        #[arg(long)]
        start: Option<String>,
    },

    /// Export the link graph to a file
    Export {
        /// Output file
        #[arg(long, default_value = "links.json")]
        output: PathBuf,

        /// Shape of the exported data
        #[arg(long, value_enum, default_value = "adjacency")]
        format: ExportFormat,

        /// Restrict edge exports to sources under this path prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Print link graph statistics and the rabbit-hole ranking
    Analyze {
        /// Entries to show per ranking
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Show crawl progress counters from the store
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl {
            limit,
            logfile,
            depth,
            topics,
            enumerate,
            workers,
            start,
        } => {
            let options = CrawlOptions {
                limit,
                max_depth: depth,
                topics: config::parse_topics(&topics),
                enumerate,
                workers,
                ..CrawlOptions::default()
            };
            handle_crawl(options, start, logfile).await?;
        }
        Command::Export {
            output,
            format,
            prefix,
        } => handle_export(format, prefix.as_deref(), &output)?,
        Command::Analyze { top } => handle_analyze(top)?,
        Command::Status => handle_status()?,
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warren=info,warn"),
            1 => EnvFilter::new("warren=debug,info"),
            2 => EnvFilter::new("warren=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Runs one crawl session against the configured store.
async fn handle_crawl(
    options: CrawlOptions,
    start: Option<String>,
    logfile: PathBuf,
) -> anyhow::Result<()> {
    let db_path = config::db_path();
    tracing::info!(
        "Starting crawl session: limit {}, depth {}, {} workers, store {}",
        options.limit,
        options.max_depth,
        options.workers,
        db_path.display()
    );

    let crawled = warren::crawler::crawl(options, start, &db_path, &logfile).await?;
    tracing::info!("Session finished: {} pages crawled", crawled);

    Ok(())
}

fn handle_export(
    format: ExportFormat,
    prefix: Option<&str>,
    output: &std::path::Path,
) -> anyhow::Result<()> {
    let store = open_store(&config::db_path())?;
    let count = output::export_graph(&store, format, prefix, output)?;
    println!("Exported {} records to {}", count, output.display());
    Ok(())
}

fn handle_analyze(top: usize) -> anyhow::Result<()> {
    let store = open_store(&config::db_path())?;
    let report = output::analyze_graph(&store, top)?;
    output::print_report(&report);
    Ok(())
}

fn handle_status() -> anyhow::Result<()> {
    let store = open_store(&config::db_path())?;
    let status = output::load_status(&store)?;
    output::print_status(&status);
    Ok(())
}
