//! Configuration structures and loading logic.

use crate::download::{ExecutionMode, RetryPolicy};
use crate::error::{Error, Result};
use crate::fetch::Browser;
use crate::scraper::Credentials;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Feed platform credentials.
#[derive(Clone, Default, Deserialize)]
pub struct AccountConfig {
    /// Login username.
    #[serde(default)]
    pub username: Option<String>,

    /// Login password.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Download options configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Directory receiving media files and the link backup.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,

    /// Stop listing a feed when this link is reached.
    #[serde(default)]
    pub until_link: Option<String>,

    /// Browser whose cookies authenticate downloads.
    #[serde(default)]
    pub cookies_from_browser: Option<String>,

    /// Download links concurrently.
    #[serde(default)]
    pub parallel: bool,

    /// Concurrent downloads in parallel mode; 0 means one per CPU.
    #[serde(default)]
    pub workers: usize,

    /// Attempts per link, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Shortest wait between attempts, in seconds.
    #[serde(default = "default_retry_delay_min")]
    pub retry_delay_min_secs: u64,

    /// Longest wait between attempts, in seconds.
    #[serde(default = "default_retry_delay_max")]
    pub retry_delay_max_secs: u64,

    /// Extra wait after a rate-limit response, in seconds.
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_secs: u64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
            until_link: None,
            cookies_from_browser: None,
            parallel: false,
            workers: 0,
            max_attempts: default_max_attempts(),
            retry_delay_min_secs: default_retry_delay_min(),
            retry_delay_max_secs: default_retry_delay_max(),
            rate_limit_cooldown_secs: default_rate_limit_cooldown(),
        }
    }
}

/// External programs.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// yt-dlp executable.
    #[serde(default = "default_yt_dlp")]
    pub yt_dlp: PathBuf,

    /// Feed scraping helper executable.
    #[serde(default = "default_scraper")]
    pub scraper: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp: default_yt_dlp(),
            scraper: default_scraper(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("videos")
}

fn default_max_attempts() -> u32 {
    60
}

fn default_retry_delay_min() -> u64 {
    5
}

fn default_retry_delay_max() -> u64 {
    5
}

fn default_rate_limit_cooldown() -> u64 {
    300
}

fn default_yt_dlp() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_scraper() -> PathBuf {
    PathBuf::from("twtvt-scraper")
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Credentials, when both username and password are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.account.username, &self.account.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials::new(username.clone(), password.clone()))
            }
            _ => None,
        }
    }

    /// Stop link for feed listings; empty strings mean no limit.
    pub fn until_link(&self) -> Option<&str> {
        self.options
            .until_link
            .as_deref()
            .filter(|link| !link.is_empty())
    }

    /// Browser to read cookies from.
    pub fn cookie_browser(&self) -> Result<Option<Browser>> {
        self.options
            .cookies_from_browser
            .as_deref()
            .map(str::parse::<Browser>)
            .transpose()
    }

    /// Retry policy for single downloads.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.options.max_attempts,
            Duration::from_secs(self.options.retry_delay_min_secs),
            Duration::from_secs(self.options.retry_delay_max_secs),
            Duration::from_secs(self.options.rate_limit_cooldown_secs),
        )
    }

    /// Scheduling mode for the download run.
    pub fn execution_mode(&self) -> ExecutionMode {
        if self.options.parallel {
            ExecutionMode::parallel(self.options.workers)
        } else {
            ExecutionMode::Sequential
        }
    }
}
