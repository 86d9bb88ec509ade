//! twtvt - collect video links from social feeds and download them
//!
//! This library resolves a mixed list of targets into individual media links
//! and downloads each one with retries.
//!
//! # Features
//!
//! - Feed post links, account media/likes listings, external links and link files
//! - One scraping session per run for all account listings
//! - Link backup written before any download starts
//! - Per-link retries with rate-limit cooldowns
//! - Sequential or parallel downloads with live progress
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use twtvt::{
//!     execute, extract_links, write_link_backup, CommandScraper, Config, DownloadJob,
//!     ProgressReporter, YtDlpFetcher,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("twtvt.toml"))?;
//!     let scraper = CommandScraper::new(&config.tools.scraper, false);
//!     let targets = vec!["links.txt".to_string()];
//!
//!     let links = extract_links(&targets, config.credentials().as_ref(), None, &scraper).await?;
//!     write_link_backup(&links, &config.options.output_directory)?;
//!
//!     let job = DownloadJob {
//!         fetcher: Arc::new(YtDlpFetcher::new(&config.tools.yt_dlp)),
//!         output_dir: config.options.output_directory.clone(),
//!         cookies: config.cookie_browser()?,
//!         policy: config.retry_policy(),
//!     };
//!     let progress = ProgressReporter::lines(links.len());
//!     let summary = execute(job, links, config.execution_mode(), &progress).await;
//!     println!("{} downloaded", summary.succeeded);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod output;
pub mod scraper;
pub mod target;

// Re-exports for convenience
pub use config::Config;
pub use download::{
    download_one, execute, run_downloads, DownloadJob, DownloadOutcome, ExecutionMode,
    LinkOutcome, RetryPolicy, RunSummary,
};
pub use error::{Error, Result};
pub use fetch::{
    Browser, FetchError, HostRouter, MediaFetcher, MediaInfo, MonsnodeFetcher, YtDlpFetcher,
};
pub use fs::write_link_backup;
pub use output::ProgressReporter;
pub use scraper::{CommandScraper, Credentials, FeedScraper, FeedSession};
pub use target::{classify, extract_links, TargetKind};
