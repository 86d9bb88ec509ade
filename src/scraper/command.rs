//! Feed scraping through an external helper program.
//!
//! The helper owns browser automation and platform navigation. It is invoked
//! as:
//!
//! ```text
//! <program> login --username U --state-file F [--headed]   (password in TWTVT_PASSWORD)
//! <program> media <account> --state-file F [--until LINK]
//! <program> likes <account> --state-file F [--until LINK]
//! ```
//!
//! Listings print one post link per line on stdout.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::scraper::{Credentials, FeedScraper, FeedSession};
use crate::target::FeedKind;

/// Environment variable carrying the password to the helper.
pub const PASSWORD_ENV: &str = "TWTVT_PASSWORD";

/// Name of the session state file inside the session directory.
const STATE_FILE: &str = "session.json";

/// Scraper backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandScraper {
    program: PathBuf,
    headed: bool,
}

impl CommandScraper {
    /// Create a scraper. `headed` shows the browser window (debug mode).
    pub fn new(program: impl Into<PathBuf>, headed: bool) -> Self {
        Self {
            program: program.into(),
            headed,
        }
    }
}

#[async_trait]
impl FeedScraper for CommandScraper {
    async fn login(&self, credentials: &Credentials) -> Result<Box<dyn FeedSession>> {
        let state_dir = tempfile::Builder::new().prefix("twtvt-session").tempdir()?;
        let state_file = state_dir.path().join(STATE_FILE);

        let mut command = Command::new(&self.program);
        command
            .arg("login")
            .arg("--username")
            .arg(&credentials.username)
            .arg("--state-file")
            .arg(&state_file)
            .env(PASSWORD_ENV, &credentials.password);
        if self.headed {
            command.arg("--headed");
        }

        tracing::info!("Logging in as {}", credentials.username);
        run_helper(&self.program, command).await?;

        Ok(Box::new(CommandSession {
            program: self.program.clone(),
            state_dir: Some(state_dir),
            state_file,
        }))
    }
}

/// Session backed by a state file the helper reads and updates.
struct CommandSession {
    program: PathBuf,
    state_dir: Option<TempDir>,
    state_file: PathBuf,
}

impl CommandSession {
    async fn list(&self, kind: FeedKind, account: &str, stop_link: &str) -> Result<Vec<String>> {
        if self.state_dir.is_none() {
            return Err(Error::Extraction("scraper session already closed".into()));
        }

        let mut command = Command::new(&self.program);
        command
            .arg(kind.to_string())
            .arg(account)
            .arg("--state-file")
            .arg(&self.state_file);
        if !stop_link.is_empty() {
            command.arg("--until").arg(stop_link);
        }

        tracing::info!("Collecting {} links of {}...", kind, account);
        let stdout = run_helper(&self.program, command).await?;
        let links = parse_link_lines(&stdout);
        tracing::info!("Found {} links in {}'s {}", links.len(), account, kind);

        Ok(links)
    }
}

#[async_trait]
impl FeedSession for CommandSession {
    async fn media_links_until(&mut self, account: &str, stop_link: &str) -> Result<Vec<String>> {
        self.list(FeedKind::Media, account, stop_link).await
    }

    async fn liked_links_until(&mut self, account: &str, stop_link: &str) -> Result<Vec<String>> {
        self.list(FeedKind::Liked, account, stop_link).await
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        if let Some(dir) = self.state_dir.take() {
            dir.close()?;
        }
        tracing::debug!("Scraper session closed");
        Ok(())
    }
}

/// Run the helper and return its stdout, mapping failures to extraction errors.
async fn run_helper(program: &Path, mut command: Command) -> Result<String> {
    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            Error::Extraction(format!(
                "failed to run scraper '{}': {}",
                program.display(),
                e
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Extraction(format!(
            "scraper exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split helper output into links, dropping blank lines.
fn parse_link_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
