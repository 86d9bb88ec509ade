//! Target URI classification.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Hosts whose pages are social feeds.
pub const FEED_PREFIXES: &[&str] = &["https://twitter.com/", "https://x.com/"];

/// Hosts whose links are downloaded as-is.
pub const EXTERNAL_PREFIXES: &[&str] = &["https://monsnode.com/"];

/// Feed sub-path listing an account's own media posts.
const MEDIA_SUFFIX: &str = "/media";

/// Feed sub-path listing posts an account liked.
const LIKED_SUFFIX: &str = "/likes";

/// Account handles: letters, digits and underscores, at most 15 characters.
static ACCOUNT_HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{1,15}$")
        .unwrap_or_else(|e| panic!("invalid account handle pattern: {e}"))
});

/// Which listing of an account a feed link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Media,
    Liked,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Media => write!(f, "media"),
            FeedKind::Liked => write!(f, "likes"),
        }
    }
}

/// Classification of a single target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A single post on a feed host.
    FeedPost,
    /// An account listing that expands into many post links.
    FeedSubset(FeedKind),
    /// A link on an external host, downloaded directly.
    ExternalLink,
    /// A local file containing one link per line.
    FilePath,
    /// None of the above.
    Invalid,
}

/// Check whether a link points at a feed host.
pub fn is_feed_link(link: &str) -> bool {
    FEED_PREFIXES.iter().any(|prefix| link.starts_with(prefix))
}

/// Check whether a link names an account's media listing.
pub fn is_media_link(link: &str) -> bool {
    link.ends_with(MEDIA_SUFFIX)
}

/// Check whether a link names an account's liked listing.
pub fn is_liked_link(link: &str) -> bool {
    link.ends_with(LIKED_SUFFIX)
}

/// Check whether a link points at a known external host.
pub fn is_external_link(link: &str) -> bool {
    EXTERNAL_PREFIXES
        .iter()
        .any(|prefix| link.starts_with(prefix))
}

/// Check whether a string names an existing regular file.
pub fn is_file_path(path: &str) -> bool {
    Path::new(path).is_file()
}

/// Classify a target string.
///
/// Host prefixes are checked first, so a local file that happens to be named
/// like a link is still treated as a link.
pub fn classify(target: &str) -> TargetKind {
    if is_feed_link(target) {
        if is_media_link(target) {
            return TargetKind::FeedSubset(FeedKind::Media);
        }
        if is_liked_link(target) {
            return TargetKind::FeedSubset(FeedKind::Liked);
        }
        return TargetKind::FeedPost;
    }

    if is_external_link(target) {
        return TargetKind::ExternalLink;
    }

    if is_file_path(target) {
        return TargetKind::FilePath;
    }

    TargetKind::Invalid
}

/// Classify every target, failing on the first one that is invalid.
pub fn validate_targets<S: AsRef<str>>(targets: &[S]) -> Result<Vec<TargetKind>> {
    targets
        .iter()
        .map(|target| {
            let target = target.as_ref();
            match classify(target) {
                TargetKind::Invalid => Err(Error::Validation(format!(
                    "'{}' is not a supported link or an existing file",
                    target
                ))),
                kind => Ok(kind),
            }
        })
        .collect()
}

/// Extract the account identifier from a feed link.
///
/// `https://twitter.com/someone/media` yields `someone`.
pub fn feed_account(link: &str) -> Result<&str> {
    let rest = FEED_PREFIXES
        .iter()
        .find_map(|prefix| link.strip_prefix(prefix))
        .ok_or_else(|| Error::Validation(format!("'{}' is not a feed link", link)))?;

    match rest.split('/').next() {
        Some(account) if ACCOUNT_HANDLE_RE.is_match(account) => Ok(account),
        _ => Err(Error::Validation(format!(
            "'{}' does not name a valid account",
            link
        ))),
    }
}
