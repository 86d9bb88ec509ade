//! Media fetching through yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::fetch::{Browser, FetchError, MediaFetcher, MediaInfo};
use crate::fs::naming::output_template;

/// Markers yt-dlp prints when the remote rate-limits us.
const RATE_LIMIT_MARKERS: &[&str] = &["HTTP Error 429", "Too Many Requests"];

/// Fetcher invoking the yt-dlp program once per attempt.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    program: PathBuf,
}

/// Subset of the info JSON yt-dlp prints with `--dump-json`.
#[derive(Debug, Deserialize)]
struct InfoJson {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    /// Final path on disk; older releases only print `_filename`.
    #[serde(default)]
    filename: Option<PathBuf>,
    #[serde(default, rename = "_filename")]
    legacy_filename: Option<PathBuf>,
}

impl YtDlpFetcher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the argument list for one download.
    fn args(&self, uri: &str, output_dir: &Path, cookies: Option<Browser>) -> Vec<String> {
        let mut args = vec![
            "--embed-subs".to_string(),
            "--no-playlist".to_string(),
            "--no-check-certificates".to_string(),
            "--no-progress".to_string(),
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--output".to_string(),
            output_template(output_dir),
        ];
        if let Some(browser) = cookies {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.to_string());
        }
        args.push("--".to_string());
        args.push(uri.to_string());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        uri: &str,
        output_dir: &Path,
        cookies: Option<Browser>,
    ) -> Result<MediaInfo, FetchError> {
        tracing::debug!("Running {} for {}", self.program.display(), uri);

        let output = Command::new(&self.program)
            .args(self.args(uri, output_dir, cookies))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    FetchError::ToolMissing(format!(
                        "{} not found; install yt-dlp and ensure it is in your PATH",
                        self.program.display()
                    ))
                } else {
                    FetchError::Transport(format!("failed to run {}: {}", self.program.display(), e))
                }
            })?;

        if !output.status.success() {
            return Err(classify_failure(&String::from_utf8_lossy(&output.stderr)));
        }

        parse_info(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Map yt-dlp's stderr to a tagged failure.
fn classify_failure(stderr: &str) -> FetchError {
    let message = stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("yt-dlp failed without output")
        .trim()
        .to_string();

    if RATE_LIMIT_MARKERS.iter().any(|marker| stderr.contains(marker)) {
        FetchError::RateLimited(message)
    } else {
        FetchError::Transport(message)
    }
}

/// Parse the last JSON line of yt-dlp's stdout.
fn parse_info(stdout: &str) -> Result<MediaInfo, FetchError> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with('{'))
        .ok_or_else(|| FetchError::Transport("yt-dlp printed no metadata".into()))?;

    let info: InfoJson = serde_json::from_str(line)
        .map_err(|e| FetchError::Transport(format!("unreadable yt-dlp metadata: {}", e)))?;

    Ok(MediaInfo {
        title: info.title.unwrap_or_else(|| info.id.clone()),
        id: info.id,
        upload_date: info.upload_date,
        path: info.filename.or(info.legacy_filename),
    })
}
