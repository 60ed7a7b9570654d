//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::application::ports::DownloadError;
use crate::application::{ExportOutput, ExportReport};
use crate::domain::export::{DownloadTarget, RunOutcome};

/// Presenter for CLI output formatting.
///
/// Status goes to stderr; stdout only carries the list of recordings in
/// summary mode and config values.
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
    }

    /// Start a spinner with message
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&self, spinner: &ProgressBar, message: &str) {
        spinner.finish_with_message(format!("{} {}", "✓".green(), message));
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&self, spinner: &ProgressBar, message: &str) {
        spinner.finish_with_message(format!("{} {}", "✗".red(), message));
    }

    /// A download progress bar that stays hidden until `start_download_bar`
    pub fn download_bar(&self) -> ProgressBar {
        ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden())
    }

    /// Size the bar for `total` downloads and start drawing it
    pub fn start_download_bar(bar: &ProgressBar, total: usize) {
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} Downloading [{bar:30.cyan/blue}] {pos}/{len} {percent}% eta {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
        );
        bar.set_length(total as u64);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        bar.enable_steady_tick(Duration::from_millis(120));
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Spinner text while pages are being fetched
    pub fn format_page_progress(page: u32, total: Option<u32>) -> String {
        match total {
            Some(total) => format!("Fetching call history... page {}/{}", page, total),
            None => format!("Fetching call history... page {}", page),
        }
    }

    /// One line per finished download
    pub fn format_download_result(
        target: &DownloadTarget,
        result: Result<u64, &DownloadError>,
    ) -> String {
        match result {
            Ok(_) => format!(
                "{} File {} successfully downloaded",
                "✓".green(),
                target.reference()
            ),
            Err(e) => format!(
                "{} File {} could not be downloaded because \"{}\"",
                "✗".red(),
                target.reference(),
                e
            ),
        }
    }

    /// Calls found, reported apart from the unique recordings
    pub fn format_found(report: &ExportReport) -> String {
        let selection = &report.selection;
        let mut line = format!("Found {} calls with recording", selection.matched_calls);
        if selection.references.len() != selection.matched_calls {
            line.push_str(&format!(
                " ({} unique recordings)",
                selection.references.len()
            ));
        }
        line
    }

    pub fn format_outcome(outcome: &RunOutcome) -> String {
        format!(
            "Downloaded {} of {} recordings ({} failed)",
            outcome.succeeded(),
            outcome.attempted(),
            outcome.failed().len()
        )
    }

    /// Print the final result of a run
    pub fn export_result(&self, output: &ExportOutput) {
        match output {
            ExportOutput::NoRecords(_) => {
                self.info("No calls found for specified filter");
            }
            ExportOutput::Summary(report) => {
                for reference in &report.selection.references {
                    self.output(reference);
                }
                self.info(&format!(
                    "{} with total duration of {} minutes",
                    Self::format_found(report),
                    report.selection.total_duration_minutes()
                ));
            }
            ExportOutput::Downloaded(report, outcome) => {
                self.info(&Self::format_found(report));
                if outcome.is_complete_success() {
                    self.success(&Self::format_outcome(outcome));
                } else {
                    self.warn(&Self::format_outcome(outcome));
                }
            }
        }
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}
