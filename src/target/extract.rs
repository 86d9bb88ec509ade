//! Link extraction from heterogeneous targets.

use std::path::Path;

use crate::error::{Error, Result};
use crate::scraper::{Credentials, FeedScraper, FeedSession};
use crate::target::classify::{feed_account, validate_targets, FeedKind, TargetKind};

/// Resolve targets into a flat list of downloadable links.
///
/// Output order is fixed: links read from files, then links listed from
/// feeds, then links passed through unchanged. Each group keeps the relative
/// order of its targets. Duplicates are kept.
///
/// All targets are validated before any file is read or any session opened.
/// A scraping session is opened only when at least one feed listing is
/// requested, and is closed on every exit path.
pub async fn extract_links<S: AsRef<str>>(
    targets: &[S],
    credentials: Option<&Credentials>,
    until_link: Option<&str>,
    scraper: &dyn FeedScraper,
) -> Result<Vec<String>> {
    let kinds = validate_targets(targets)?;

    let mut files = Vec::new();
    let mut feeds = Vec::new();
    let mut pass_through = Vec::new();

    for (target, kind) in targets.iter().zip(kinds) {
        let target = target.as_ref();
        match kind {
            TargetKind::FilePath => files.push(target),
            TargetKind::FeedSubset(feed_kind) => feeds.push((feed_account(target)?, feed_kind)),
            TargetKind::FeedPost | TargetKind::ExternalLink => pass_through.push(target),
            TargetKind::Invalid => unreachable!("validate_targets rejects invalid targets"),
        }
    }

    let credentials = match (feeds.is_empty(), credentials) {
        (true, _) => None,
        (false, Some(credentials)) => Some(credentials),
        (false, None) => {
            return Err(Error::Credential(
                "username and password are required for feed targets".into(),
            ))
        }
    };

    let mut links = Vec::new();

    for file in files {
        let file_links = read_link_file(Path::new(file)).await?;
        tracing::info!("Read {} links from {}", file_links.len(), file);
        links.extend(file_links);
    }

    if let Some(credentials) = credentials {
        let mut session = scraper.login(credentials).await?;
        let listed = collect_feed_links(session.as_mut(), &feeds, until_link.unwrap_or("")).await;
        let closed = session.close().await;
        links.extend(listed?);
        closed?;
    }

    links.extend(pass_through.into_iter().map(str::to_string));

    Ok(links)
}

/// List every feed account through one session, stopping at the first failure.
async fn collect_feed_links(
    session: &mut dyn FeedSession,
    feeds: &[(&str, FeedKind)],
    stop_link: &str,
) -> Result<Vec<String>> {
    let mut links = Vec::new();
    for (account, kind) in feeds {
        let listed = session.links_until(*kind, account, stop_link).await?;
        links.extend(listed);
    }
    Ok(links)
}

/// Read a link file, one link per line.
///
/// Lines are taken verbatim with one exception: blank lines are skipped, so a
/// file ending in a newline or padded with empty lines yields no empty links.
/// The result is therefore the file's non-blank lines, not every line.
pub async fn read_link_file(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Extraction(format!("failed to read {}: {}", path.display(), e))
    })?;

    Ok(content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}
