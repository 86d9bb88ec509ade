//! Media download collaborator.
//!
//! This module provides:
//! - The `MediaFetcher` interface the retrying downloader consumes
//! - `YtDlpFetcher`, backed by the yt-dlp program
//! - `MonsnodeFetcher`, which resolves external-host pages over HTTP
//! - `HostRouter`, choosing a fetcher per link
//! - Browser cookie source selection

pub mod browser;
pub mod monsnode;
pub mod route;
pub mod ytdlp;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use browser::Browser;
pub use monsnode::MonsnodeFetcher;
pub use route::HostRouter;
pub use ytdlp::YtDlpFetcher;

/// Metadata of a fetched media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub id: String,
    pub title: String,
    pub upload_date: Option<String>,
    /// Where the file was written, as reported by the fetcher.
    pub path: Option<PathBuf>,
}

impl MediaInfo {
    /// Saved file name, or the title when the fetcher did not report a path.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.title.clone())
    }
}

/// Failure of a single fetch attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote signalled "too many requests".
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other transport failure; worth retrying.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The download program could not be started; retrying cannot help.
    #[error("Download tool unavailable: {0}")]
    ToolMissing(String),
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_retriable(&self) -> bool {
        !matches!(self, FetchError::ToolMissing(_))
    }
}

/// Fetches one media resource into a directory.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(
        &self,
        uri: &str,
        output_dir: &Path,
        cookies: Option<Browser>,
    ) -> Result<MediaInfo, FetchError>;
}
