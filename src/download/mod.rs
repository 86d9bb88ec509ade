//! Download module for fetching resolved links.
//!
//! This module provides:
//! - Per-link outcomes and run statistics
//! - The retrying single-link downloader
//! - Sequential and parallel execution over a link list

pub mod engine;
pub mod outcome;
pub mod retry;

pub use engine::{execute, host_parallelism, run_downloads, DownloadJob, ExecutionMode};
pub use outcome::{DownloadOutcome, LinkOutcome, RunSummary};
pub use retry::{download_one, RetryPolicy};
