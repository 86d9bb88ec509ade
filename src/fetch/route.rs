//! Per-link fetcher selection.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::fetch::{Browser, FetchError, MediaFetcher, MediaInfo};
use crate::target::is_external_link;

/// Sends external-host links to their own fetcher and everything else to the
/// general one.
#[derive(Clone)]
pub struct HostRouter {
    external: Arc<dyn MediaFetcher>,
    general: Arc<dyn MediaFetcher>,
}

impl HostRouter {
    pub fn new(external: Arc<dyn MediaFetcher>, general: Arc<dyn MediaFetcher>) -> Self {
        Self { external, general }
    }

    fn fetcher_for(&self, uri: &str) -> &dyn MediaFetcher {
        if is_external_link(uri) {
            self.external.as_ref()
        } else {
            self.general.as_ref()
        }
    }
}

#[async_trait]
impl MediaFetcher for HostRouter {
    async fn fetch(
        &self,
        uri: &str,
        output_dir: &Path,
        cookies: Option<Browser>,
    ) -> Result<MediaInfo, FetchError> {
        self.fetcher_for(uri).fetch(uri, output_dir, cookies).await
    }
}
