//! Execution of downloads over a whole link list.
//!
//! Sequential mode downloads links one after the other and yields outcomes in
//! input order. Parallel mode dispatches links in input order to a fixed
//! number of workers and yields outcomes as they complete; every outcome
//! carries the index of its link.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, Semaphore};

use crate::download::outcome::{LinkOutcome, RunSummary};
use crate::download::retry::{download_one, RetryPolicy};
use crate::fetch::{Browser, MediaFetcher};
use crate::output::progress::ProgressReporter;

/// How links are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionMode {
    /// Parallel mode sized to the host, or `workers` when non-zero.
    pub fn parallel(workers: usize) -> Self {
        let workers = if workers == 0 {
            host_parallelism()
        } else {
            workers
        };
        ExecutionMode::Parallel { workers }
    }
}

/// Number of CPUs available to this process.
pub fn host_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Everything a worker needs to download a link. Shared read-only.
#[derive(Clone)]
pub struct DownloadJob {
    pub fetcher: Arc<dyn MediaFetcher>,
    pub output_dir: PathBuf,
    pub cookies: Option<Browser>,
    pub policy: RetryPolicy,
}

impl DownloadJob {
    async fn run_one(&self, index: usize, link: String) -> LinkOutcome {
        tracing::debug!("Starting #{}: {}", index + 1, link);
        let outcome = download_one(
            self.fetcher.as_ref(),
            &link,
            &self.output_dir,
            self.cookies,
            &self.policy,
        )
        .await;
        LinkOutcome {
            index,
            link,
            outcome,
        }
    }
}

/// Stream one outcome per link.
///
/// Parallel mode spawns onto the current tokio runtime.
pub fn run_downloads(
    job: DownloadJob,
    links: Vec<String>,
    mode: ExecutionMode,
) -> BoxStream<'static, LinkOutcome> {
    match mode {
        ExecutionMode::Sequential => stream::iter(links.into_iter().enumerate())
            .then(move |(index, link)| {
                let job = job.clone();
                async move { job.run_one(index, link).await }
            })
            .boxed(),
        ExecutionMode::Parallel { workers } => run_parallel(job, links, workers.max(1)),
    }
}

fn run_parallel(job: DownloadJob, links: Vec<String>, workers: usize) -> BoxStream<'static, LinkOutcome> {
    let (tx, rx) = mpsc::unbounded_channel();
    let slots = Arc::new(Semaphore::new(workers));

    tokio::spawn(async move {
        for (index, link) in links.into_iter().enumerate() {
            // A slot frees up as soon as a worker has produced its outcome
            let permit = match slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let job = job.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = job.run_one(index, link).await;
                drop(permit);
                let _ = tx.send(outcome);
            });
        }
    });

    stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|outcome| (outcome, rx))
    })
    .boxed()
}

/// Run every link to completion, reporting progress as outcomes arrive.
pub async fn execute(
    job: DownloadJob,
    links: Vec<String>,
    mode: ExecutionMode,
    progress: &ProgressReporter,
) -> RunSummary {
    let mut summary = RunSummary::new(links.len());
    let mut outcomes = run_downloads(job, links, mode);

    while let Some(outcome) = outcomes.next().await {
        progress.record(&outcome);
        summary.record(&outcome);
    }
    progress.finish();

    if summary.missing() > 0 {
        tracing::error!("{} links ended without an outcome", summary.missing());
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::outcome::DownloadOutcome;
    use crate::fetch::{FetchError, MediaInfo};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher that fails links containing "bad" and tracks concurrency.
    #[derive(Default)]
    struct FakeFetcher {
        running: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MediaFetcher for FakeFetcher {
        async fn fetch(
            &self,
            uri: &str,
            _output_dir: &Path,
            _cookies: Option<Browser>,
        ) -> Result<MediaInfo, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Later links finish first so completion order differs from input order
            let delay: u64 = uri.rsplit('/').next().and_then(|n| n.parse().ok()).unwrap_or(1);
            tokio::time::sleep(Duration::from_millis(100 - delay)).await;

            self.running.fetch_sub(1, Ordering::SeqCst);
            if uri.contains("bad") {
                Err(FetchError::Transport("broken".into()))
            } else {
                Ok(MediaInfo {
                    id: uri.to_string(),
                    title: "clip".into(),
                    upload_date: None,
                    path: None,
                })
            }
        }
    }

    fn job(fetcher: Arc<FakeFetcher>) -> DownloadJob {
        DownloadJob {
            fetcher,
            output_dir: PathBuf::from("videos"),
            cookies: None,
            policy: RetryPolicy::fixed(3, Duration::from_secs(1), Duration::from_secs(60)),
        }
    }

    fn links() -> Vec<String> {
        vec![
            "https://ok/1".into(),
            "https://bad/2".into(),
            "https://ok/3".into(),
            "https://ok/4".into(),
            "https://bad/5".into(),
            "https://ok/1".into(),
        ]
    }

    fn by_index(outcomes: &[LinkOutcome]) -> BTreeMap<usize, (String, bool)> {
        outcomes
            .iter()
            .map(|o| (o.index, (o.link.clone(), o.outcome.is_success())))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_preserves_order() {
        let fetcher = Arc::new(FakeFetcher::default());
        let outcomes: Vec<_> = run_downloads(job(fetcher.clone()), links(), ExecutionMode::Sequential)
            .collect()
            .await;

        let indices: Vec<_> = outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_matches_sequential_outcomes() {
        let sequential: Vec<_> = run_downloads(
            job(Arc::new(FakeFetcher::default())),
            links(),
            ExecutionMode::Sequential,
        )
        .collect()
        .await;

        let fetcher = Arc::new(FakeFetcher::default());
        let parallel: Vec<_> = run_downloads(
            job(fetcher.clone()),
            links(),
            ExecutionMode::Parallel { workers: 3 },
        )
        .collect()
        .await;

        assert_eq!(parallel.len(), 6);
        assert_eq!(by_index(&parallel), by_index(&sequential));
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_other_links() {
        let fetcher = Arc::new(FakeFetcher::default());
        let progress = ProgressReporter::hidden(6);

        let summary = execute(
            job(fetcher.clone()),
            links(),
            ExecutionMode::Parallel { workers: 2 },
            &progress,
        )
        .await;

        assert_eq!(summary.succeeded, 4);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(summary.missing(), 0);
        assert_eq!(progress.completed(), 6);
        // 4 good links once, 2 bad links three times each
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 4 + 2 * 3);
        for (_, link, reason) in &summary.failed {
            assert!(link.contains("bad"));
            assert_eq!(reason, "Transport error: broken");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_failure_outcome_is_non_retriable() {
        let fetcher = Arc::new(FakeFetcher::default());
        let outcomes: Vec<_> = run_downloads(
            job(fetcher),
            vec!["https://bad/1".into()],
            ExecutionMode::Parallel { workers: 1 },
        )
        .collect()
        .await;

        assert!(matches!(
            outcomes[0].outcome,
            DownloadOutcome::Failure { retriable: false, attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_link_list() {
        let fetcher = Arc::new(FakeFetcher::default());
        let progress = ProgressReporter::hidden(0);
        let summary = execute(job(fetcher), Vec::new(), ExecutionMode::parallel(0), &progress).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.completed(), 0);
    }

    #[test]
    fn test_parallel_mode_sizing() {
        assert_eq!(
            ExecutionMode::parallel(0),
            ExecutionMode::Parallel {
                workers: host_parallelism()
            }
        );
        assert_eq!(
            ExecutionMode::parallel(7),
            ExecutionMode::Parallel { workers: 7 }
        );
    }
}
