//! Target module for classifying inputs and resolving them into links.
//!
//! Provides:
//! - Target classification (feed listings, posts, external links, files)
//! - Link extraction across files, feeds and direct links

pub mod classify;
pub mod extract;

pub use classify::{
    classify, feed_account, is_external_link, validate_targets, FeedKind, TargetKind,
};
pub use extract::{extract_links, read_link_file};
