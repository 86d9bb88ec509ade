//! Feed scraping collaborator.
//!
//! This module provides:
//! - The `FeedScraper`/`FeedSession` interface the link extractor consumes
//! - `CommandScraper`, which drives an external helper program

pub mod command;

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::target::FeedKind;

pub use command::CommandScraper;

/// Login credentials for the feed platform.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opens authenticated sessions against the feed platform.
#[async_trait]
pub trait FeedScraper: Send + Sync {
    /// Log in once; the returned session is reused for every feed target.
    async fn login(&self, credentials: &Credentials) -> Result<Box<dyn FeedSession>>;
}

/// An authenticated scraping session.
///
/// An empty `stop_link` means the whole feed is listed.
#[async_trait]
pub trait FeedSession: Send {
    /// List video post links from an account's media tab, newest first.
    async fn media_links_until(&mut self, account: &str, stop_link: &str) -> Result<Vec<String>>;

    /// List video post links an account liked, newest first.
    async fn liked_links_until(&mut self, account: &str, stop_link: &str) -> Result<Vec<String>>;

    /// Release the session.
    async fn close(self: Box<Self>) -> Result<()>;

    /// Dispatch to the listing matching `kind`.
    async fn links_until(
        &mut self,
        kind: FeedKind,
        account: &str,
        stop_link: &str,
    ) -> Result<Vec<String>> {
        match kind {
            FeedKind::Media => self.media_links_until(account, stop_link).await,
            FeedKind::Liked => self.liked_links_until(account, stop_link).await,
        }
    }
}
