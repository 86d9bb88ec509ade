//! Progress reporting for download runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::download::{DownloadOutcome, LinkOutcome};

/// Create a progress bar for item counts.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                message
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar
}

/// Counts finished links and reports each one.
///
/// The count is a monotonic counter of arrivals, so out-of-order completion
/// never moves it backwards.
pub struct ProgressReporter {
    total: usize,
    completed: AtomicUsize,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Report with one log line per finished link.
    pub fn lines(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar: None,
        }
    }

    /// Report on a progress bar.
    pub fn bar(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar: Some(create_item_bar(total as u64, "Downloading")),
        }
    }

    /// Report nowhere; only counts.
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden());
        Self {
            total,
            completed: AtomicUsize::new(0),
            bar: Some(bar),
        }
    }

    /// Number of links finished so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Count and report one finished link.
    pub fn record(&self, outcome: &LinkOutcome) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let line = format_outcome(done, self.total, outcome);

        match &self.bar {
            Some(bar) => {
                bar.println(line);
                bar.set_position(done as u64);
            }
            None => {
                if outcome.outcome.is_success() {
                    tracing::info!("{}", line);
                } else {
                    tracing::warn!("{}", line);
                }
            }
        }
    }

    /// Clear the bar, if any.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

/// One progress line: `[done/total] OK|FAIL #index name`.
fn format_outcome(done: usize, total: usize, outcome: &LinkOutcome) -> String {
    match &outcome.outcome {
        DownloadOutcome::Success { info, attempts } => {
            let retried = if *attempts > 1 {
                format!(" after {} attempts", attempts)
            } else {
                String::new()
            };
            format!(
                "[{}/{}] {} #{} {}{}",
                done,
                total,
                style("OK").green().bold(),
                outcome.index + 1,
                info.display_name(),
                retried
            )
        }
        DownloadOutcome::Failure {
            reason, attempts, ..
        } => format!(
            "[{}/{}] {} #{} {} ({} attempts): {}",
            done,
            total,
            style("FAIL").red().bold(),
            outcome.index + 1,
            outcome.link,
            attempts,
            reason
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MediaInfo;

    fn outcome(index: usize, ok: bool) -> LinkOutcome {
        LinkOutcome {
            index,
            link: format!("https://a/{}", index),
            outcome: if ok {
                DownloadOutcome::Success {
                    info: MediaInfo {
                        id: "42".into(),
                        title: "Clip".into(),
                        upload_date: Some("20240101".into()),
                        path: Some("videos/Clip [20240101] [42].mp4".into()),
                    },
                    attempts: 2,
                }
            } else {
                DownloadOutcome::Failure {
                    reason: "gone".into(),
                    retriable: false,
                    attempts: 60,
                }
            },
        }
    }

    #[test]
    fn test_counter_is_monotonic_under_out_of_order_arrivals() {
        let progress = ProgressReporter::hidden(3);
        progress.record(&outcome(2, true));
        assert_eq!(progress.completed(), 1);
        progress.record(&outcome(0, false));
        progress.record(&outcome(1, true));
        assert_eq!(progress.completed(), 3);
    }

    #[test]
    fn test_format_outcome_maps_back_to_link() {
        console::set_colors_enabled(false);
        let ok = format_outcome(1, 3, &outcome(2, true));
        assert_eq!(ok, "[1/3] OK #3 Clip [20240101] [42].mp4 after 2 attempts");

        let failed = format_outcome(2, 3, &outcome(0, false));
        assert_eq!(failed, "[2/3] FAIL #1 https://a/0 (60 attempts): gone");
    }

    #[test]
    fn test_format_outcome_without_path_shows_title() {
        console::set_colors_enabled(false);
        let mut pending = outcome(0, true);
        if let DownloadOutcome::Success { info, .. } = &mut pending.outcome {
            info.path = None;
        }
        assert_eq!(
            format_outcome(1, 1, &pending),
            "[1/1] OK #1 Clip after 2 attempts"
        );
    }
}
