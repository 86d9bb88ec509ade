//! Download outcomes and run statistics.

use crate::fetch::MediaInfo;

/// Result of downloading one link, after all retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success {
        info: MediaInfo,
        attempts: u32,
    },
    Failure {
        reason: String,
        retriable: bool,
        attempts: u32,
    },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }

    /// Number of fetch attempts made.
    pub fn attempts(&self) -> u32 {
        match self {
            DownloadOutcome::Success { attempts, .. } | DownloadOutcome::Failure { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// An outcome tied back to the link it was produced for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Position of the link in the dispatched list.
    pub index: usize,
    pub link: String,
    pub outcome: DownloadOutcome,
}

/// Statistics for a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    /// Failed links as (index, link, reason), in arrival order.
    pub failed: Vec<(usize, String, String)>,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Count one finished link.
    pub fn record(&mut self, outcome: &LinkOutcome) {
        match &outcome.outcome {
            DownloadOutcome::Success { .. } => self.succeeded += 1,
            DownloadOutcome::Failure { reason, .. } => {
                self.failed
                    .push((outcome.index, outcome.link.clone(), reason.clone()))
            }
        }
    }

    /// Links that finished, successfully or not.
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// Links that never produced an outcome.
    pub fn missing(&self) -> usize {
        self.total.saturating_sub(self.completed())
    }
}
