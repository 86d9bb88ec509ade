//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Feed video downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "twtvt",
    version,
    about = "Download videos from feed posts, account listings and link files",
    long_about = "Collects video links from feed posts, an account's media or likes, external \
                  links and local link files, saves them to a backup file, then downloads each \
                  one with retries.\n\n\
                  Account listings (…/media, …/likes) require --username and --password."
)]
pub struct Args {
    /// Video post links, account media/likes links, or files with one link per line.
    #[arg(required = true, num_args = 1..)]
    pub targets: Vec<String>,

    /// Feed platform username.
    #[arg(short, long, env = "TWTVT_USERNAME")]
    pub username: Option<String>,

    /// Feed platform password.
    #[arg(short, long, env = "TWTVT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Browser to read cookies from for downloads.
    #[arg(long = "cookies-from-browser", value_name = "NAME")]
    pub cookies_from_browser: Option<String>,

    /// Output directory for videos and the link backup.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep listing feeds until this link is found.
    #[arg(long = "until-link", value_name = "LINK")]
    pub until_link: Option<String>,

    /// Download links in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Parallel downloads (defaults to one per CPU).
    #[arg(long, requires = "parallel")]
    pub workers: Option<usize>,

    /// Attempts per link before giving up.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "twtvt.toml")]
    pub config: PathBuf,

    /// Enable debug logging and show the scraping browser.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(username) = &self.username {
            config.account.username = Some(username.clone());
        }

        if let Some(password) = &self.password {
            config.account.password = Some(password.clone());
        }

        if let Some(browser) = &self.cookies_from_browser {
            config.options.cookies_from_browser = Some(browser.clone());
        }

        if let Some(output) = &self.output {
            config.options.output_directory = output.clone();
        }

        if let Some(link) = &self.until_link {
            config.options.until_link = Some(link.clone());
        }

        // Boolean flags (only override if set to non-default)
        if self.parallel {
            config.options.parallel = true;
        }

        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }

        if let Some(attempts) = self.max_attempts {
            config.options.max_attempts = attempts;
        }
    }
}
