//! Outcome of a download run

use super::target::DownloadTarget;

/// A download that did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub target: DownloadTarget,
    pub message: String,
}

/// Accumulated result of the download phase.
/// Only the orchestrator updates it, one target at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    attempted: usize,
    succeeded: usize,
    bytes_written: u64,
    failed: Vec<FailedDownload>,
}

impl RunOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.attempted += 1;
        self.succeeded += 1;
        self.bytes_written += bytes;
    }

    pub fn record_failure(&mut self, target: DownloadTarget, message: impl Into<String>) {
        self.attempted += 1;
        self.failed.push(FailedDownload {
            target,
            message: message.into(),
        });
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn failed(&self) -> &[FailedDownload] {
        &self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn counts_successes_and_failures_separately() {
        let mut outcome = RunOutcome::new();
        outcome.record_success(10);
        outcome.record_success(5);
        outcome.record_failure(DownloadTarget::new("a.mp3", Path::new("d")), "HTTP 404");

        assert_eq!(outcome.attempted(), 3);
        assert_eq!(outcome.succeeded(), 2);
        assert_eq!(outcome.bytes_written(), 15);
        assert_eq!(outcome.failed().len(), 1);
        assert_eq!(outcome.failed()[0].message, "HTTP 404");
        assert!(!outcome.is_complete_success());
    }

    #[test]
    fn empty_outcome_is_success() {
        let outcome = RunOutcome::new();
        assert_eq!(outcome.attempted(), 0);
        assert!(outcome.is_complete_success());
    }
}
