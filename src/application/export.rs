//! Export recordings use case

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::call::CallFilter;
use crate::domain::error::RemoteError;
use crate::domain::export::{select_recordings, DownloadTarget, RecordingSelection, RunOutcome};

use super::fetch_calls::fetch_all_calls;
use super::ports::{CallHistory, DownloadError, RecordingDownloader};

/// Errors that abort the whole run
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to fetch call history: {0}")]
    Fetch(#[from] RemoteError),
}

/// Pipeline stages, in the order a run moves through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Fetching,
    Filtering,
    Reporting,
    Downloading,
    Done,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Filtering => "filtering",
            Self::Reporting => "reporting",
            Self::Downloading => "downloading",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Input parameters for the export use case
#[derive(Debug, Clone)]
pub struct ExportInput {
    pub filter: CallFilter,
    /// Root directory recordings are written under
    pub output_dir: PathBuf,
    /// Download the recordings, or only summarize them
    pub download: bool,
}

/// What the fetch and filter phases found
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub pages_fetched: u32,
    pub calls_fetched: usize,
    pub selection: RecordingSelection,
}

/// Output from the export use case
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutput {
    /// No call in the range carried a recording
    NoRecords(ExportReport),
    /// Summary mode: nothing was downloaded
    Summary(ExportReport),
    Downloaded(ExportReport, RunOutcome),
}

impl ExportOutput {
    pub fn report(&self) -> &ExportReport {
        match self {
            Self::NoRecords(report) | Self::Summary(report) | Self::Downloaded(report, _) => report,
        }
    }
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct ExportCallbacks {
    /// Called on every stage transition
    pub on_stage: Option<Box<dyn Fn(ExportStage) + Send + Sync>>,
    /// Called after each page with (page, total_pages)
    pub on_page: Option<Box<dyn Fn(u32, Option<u32>) + Send + Sync>>,
    /// Called before the first download with the number of targets
    pub on_downloads_start: Option<Box<dyn Fn(usize) + Send + Sync>>,
    /// Called after each download attempt, successful or not
    pub on_download_finished:
        Option<Box<dyn Fn(&DownloadTarget, Result<u64, &DownloadError>) + Send + Sync>>,
}

impl ExportCallbacks {
    fn stage(&self, stage: ExportStage) {
        tracing::debug!(%stage, "export stage");
        if let Some(ref cb) = self.on_stage {
            cb(stage);
        }
    }
}

/// Fetch, filter and download (or summarize) recordings
pub struct ExportRecordingsUseCase<H, D>
where
    H: CallHistory,
    D: RecordingDownloader,
{
    history: H,
    downloader: D,
}

impl<H, D> ExportRecordingsUseCase<H, D>
where
    H: CallHistory,
    D: RecordingDownloader,
{
    /// Create a new use case instance
    pub fn new(history: H, downloader: D) -> Self {
        Self {
            history,
            downloader,
        }
    }

    /// Execute the export workflow.
    ///
    /// A failure while fetching aborts the run before anything is
    /// downloaded. A failed download is recorded and the run continues.
    pub async fn execute(
        &self,
        input: ExportInput,
        callbacks: ExportCallbacks,
    ) -> Result<ExportOutput, ExportError> {
        callbacks.stage(ExportStage::Idle);

        callbacks.stage(ExportStage::Fetching);
        let fetched = fetch_all_calls(&self.history, &input.filter, |page, total| {
            if let Some(ref cb) = callbacks.on_page {
                cb(page, total);
            }
        })
        .await?;

        callbacks.stage(ExportStage::Filtering);
        let selection = select_recordings(&fetched.records, input.filter.extension_override);
        for collision in &selection.collisions {
            tracing::warn!(
                kept = %collision.kept,
                dropped = %collision.dropped,
                rewritten = %collision.rewritten,
                "extension override maps two recordings to the same file, downloading once"
            );
        }

        let report = ExportReport {
            pages_fetched: fetched.pages,
            calls_fetched: fetched.records.len(),
            selection,
        };
        tracing::info!(
            pages = report.pages_fetched,
            calls = report.calls_fetched,
            with_recording = report.selection.matched_calls,
            unique_recordings = report.selection.references.len(),
            "call history fetched"
        );

        if report.selection.is_empty() {
            callbacks.stage(ExportStage::Done);
            return Ok(ExportOutput::NoRecords(report));
        }

        if !input.download {
            callbacks.stage(ExportStage::Reporting);
            callbacks.stage(ExportStage::Done);
            return Ok(ExportOutput::Summary(report));
        }

        callbacks.stage(ExportStage::Downloading);
        let outcome = self.download_all(&report.selection, &input, &callbacks).await;
        callbacks.stage(ExportStage::Done);

        Ok(ExportOutput::Downloaded(report, outcome))
    }

    /// Download every selected recording, one at a time
    async fn download_all(
        &self,
        selection: &RecordingSelection,
        input: &ExportInput,
        callbacks: &ExportCallbacks,
    ) -> RunOutcome {
        let targets: Vec<DownloadTarget> = selection
            .references
            .iter()
            .map(|reference| {
                DownloadTarget::new(reference.as_str(), &input.output_dir)
                    .with_linked_id(selection.linked_ids.get(reference).cloned())
            })
            .collect();

        if let Some(ref cb) = callbacks.on_downloads_start {
            cb(targets.len());
        }

        let mut outcome = RunOutcome::new();
        for target in targets {
            match self.downloader.download(&target).await {
                Ok(bytes) => {
                    tracing::info!(
                        reference = %target.reference(),
                        destination = %target.destination().display(),
                        bytes,
                        "recording downloaded"
                    );
                    if let Some(ref cb) = callbacks.on_download_finished {
                        cb(&target, Ok(bytes));
                    }
                    outcome.record_success(bytes);
                }
                Err(e) => {
                    tracing::warn!(
                        reference = %target.reference(),
                        destination = %target.destination().display(),
                        error = %e,
                        "recording download failed"
                    );
                    if let Some(ref cb) = callbacks.on_download_finished {
                        cb(&target, Err(&e));
                    }
                    outcome.record_failure(target, e.to_string());
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{CallPage, CallRecord};
    use crate::domain::error::StorageError;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    fn call(recording: &str, duration: f64) -> CallRecord {
        CallRecord {
            unique_id: String::new(),
            recording: Some(recording.to_string()),
            duration,
            linked_id: None,
        }
    }

    struct MockHistory {
        pages: Vec<CallPage>,
        fail: Option<RemoteError>,
    }

    #[async_trait]
    impl CallHistory for MockHistory {
        async fn fetch_page(&self, _filter: &CallFilter, page: u32) -> Result<CallPage, RemoteError> {
            if let Some(ref e) = self.fail {
                return Err(e.clone());
            }
            Ok(self.pages.get(page as usize - 1).cloned().unwrap_or_default())
        }
    }

    /// Records every target it is asked for; references listed in
    /// `failing` are rejected with HTTP 404.
    #[derive(Clone, Default)]
    struct MockDownloader {
        calls: Arc<Mutex<Vec<String>>>,
        linked_ids: Arc<Mutex<Vec<Option<String>>>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl RecordingDownloader for MockDownloader {
        async fn download(&self, target: &DownloadTarget) -> Result<u64, DownloadError> {
            self.calls.lock().unwrap().push(target.reference().to_string());
            self.linked_ids
                .lock()
                .unwrap()
                .push(target.linked_id().map(str::to_string));
            if self.failing.iter().any(|f| f == target.reference()) {
                return Err(RemoteError::from_status(404, "not found").into());
            }
            Ok(100)
        }
    }

    fn input(download: bool) -> ExportInput {
        ExportInput {
            filter: CallFilter::new("2018-08-01", "2018-08-31"),
            output_dir: PathBuf::from("downloads"),
            download,
        }
    }

    fn two_page_history() -> MockHistory {
        MockHistory {
            pages: vec![
                CallPage {
                    items: vec![call("", 5.0), call("2018/08/01/x.mp3", 60.0)],
                    next_link: Some("?page=2".into()),
                    total_pages: Some(2),
                },
                CallPage {
                    items: vec![call("2018/08/10/abc.mp3", 30.0), call("2018/08/01/x.mp3", 60.0)],
                    next_link: None,
                    total_pages: Some(2),
                },
            ],
            fail: None,
        }
    }

    #[tokio::test]
    async fn downloads_each_unique_recording_once() {
        let downloader = MockDownloader::default();
        let calls = Arc::clone(&downloader.calls);
        let use_case = ExportRecordingsUseCase::new(two_page_history(), downloader);

        let output = use_case
            .execute(input(true), ExportCallbacks::default())
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["2018/08/01/x.mp3", "2018/08/10/abc.mp3"]
        );
        let ExportOutput::Downloaded(report, outcome) = output else {
            panic!("expected download output");
        };
        assert_eq!(report.pages_fetched, 2);
        assert_eq!(report.calls_fetched, 4);
        assert_eq!(report.selection.matched_calls, 3);
        assert_eq!(outcome.attempted(), 2);
        assert_eq!(outcome.succeeded(), 2);
    }

    #[tokio::test]
    async fn linked_id_of_the_call_reaches_the_downloader() {
        let mut linked = call("2018/08/10/abc.mp3", 30.0);
        linked.linked_id = Some("1533890000.42".into());
        let history = MockHistory {
            pages: vec![CallPage::single(vec![linked, call("b.mp3", 1.0)])],
            fail: None,
        };
        let downloader = MockDownloader::default();
        let linked_ids = Arc::clone(&downloader.linked_ids);
        let use_case = ExportRecordingsUseCase::new(history, downloader);

        use_case
            .execute(input(true), ExportCallbacks::default())
            .await
            .unwrap();

        assert_eq!(
            *linked_ids.lock().unwrap(),
            vec![Some("1533890000.42".to_string()), None]
        );
    }

    #[tokio::test]
    async fn failed_download_does_not_stop_the_batch() {
        let downloader = MockDownloader {
            failing: vec!["2018/08/01/x.mp3".to_string()],
            ..Default::default()
        };
        let calls = Arc::clone(&downloader.calls);
        let use_case = ExportRecordingsUseCase::new(two_page_history(), downloader);

        let output = use_case
            .execute(input(true), ExportCallbacks::default())
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
        let ExportOutput::Downloaded(_, outcome) = output else {
            panic!("expected download output");
        };
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(outcome.failed().len(), 1);
        assert_eq!(outcome.failed()[0].target.reference(), "2018/08/01/x.mp3");
        assert!(outcome.failed()[0].message.contains("404"));
    }

    #[tokio::test]
    async fn summary_mode_never_downloads() {
        let downloader = MockDownloader::default();
        let calls = Arc::clone(&downloader.calls);
        let use_case = ExportRecordingsUseCase::new(two_page_history(), downloader);

        let output = use_case
            .execute(input(false), ExportCallbacks::default())
            .await
            .unwrap();

        assert!(calls.lock().unwrap().is_empty());
        let ExportOutput::Summary(report) = output else {
            panic!("expected summary output");
        };
        assert_eq!(report.selection.total_duration_secs, 150.0);
        assert_eq!(report.selection.total_duration_minutes(), "2.5");
    }

    #[tokio::test]
    async fn fetch_failure_aborts_before_downloading() {
        let history = MockHistory {
            pages: vec![],
            fail: Some(RemoteError::Unauthorized),
        };
        let downloader = MockDownloader::default();
        let calls = Arc::clone(&downloader.calls);
        let use_case = ExportRecordingsUseCase::new(history, downloader);

        let result = use_case.execute(input(true), ExportCallbacks::default()).await;

        assert!(matches!(
            result,
            Err(ExportError::Fetch(RemoteError::Unauthorized))
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_recordings_ends_early() {
        let history = MockHistory {
            pages: vec![CallPage::single(vec![call("", 1.0)])],
            fail: None,
        };
        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);
        let callbacks = ExportCallbacks {
            on_stage: Some(Box::new(move |s| seen.lock().unwrap().push(s))),
            ..Default::default()
        };
        let use_case = ExportRecordingsUseCase::new(history, MockDownloader::default());

        let output = use_case.execute(input(true), callbacks).await.unwrap();

        assert!(matches!(output, ExportOutput::NoRecords(_)));
        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                ExportStage::Idle,
                ExportStage::Fetching,
                ExportStage::Filtering,
                ExportStage::Done
            ]
        );
    }

    #[tokio::test]
    async fn download_stages_and_callbacks() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let finished = Arc::new(Mutex::new(Vec::new()));
        let seen_stages = Arc::clone(&stages);
        let seen_finished = Arc::clone(&finished);
        let callbacks = ExportCallbacks {
            on_stage: Some(Box::new(move |s| seen_stages.lock().unwrap().push(s))),
            on_download_finished: Some(Box::new(
                move |target: &DownloadTarget, result: Result<u64, &DownloadError>| {
                    seen_finished
                        .lock()
                        .unwrap()
                        .push((target.destination().to_path_buf(), result.is_ok()));
                },
            )),
            ..Default::default()
        };
        let downloader = MockDownloader {
            failing: vec!["2018/08/10/abc.mp3".to_string()],
            ..Default::default()
        };
        let use_case = ExportRecordingsUseCase::new(two_page_history(), downloader);

        use_case.execute(input(true), callbacks).await.unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                ExportStage::Idle,
                ExportStage::Fetching,
                ExportStage::Filtering,
                ExportStage::Downloading,
                ExportStage::Done
            ]
        );
        assert_eq!(
            *finished.lock().unwrap(),
            vec![
                (Path::new("downloads/2018/08/01/x.mp3").to_path_buf(), true),
                (Path::new("downloads/2018/08/10/abc.mp3").to_path_buf(), false),
            ]
        );
    }

    #[tokio::test]
    async fn storage_error_is_per_item() {
        struct DeniedDownloader;

        #[async_trait]
        impl RecordingDownloader for DeniedDownloader {
            async fn download(&self, target: &DownloadTarget) -> Result<u64, DownloadError> {
                Err(StorageError::PermissionDenied {
                    path: target.destination().to_path_buf(),
                }
                .into())
            }
        }

        let use_case = ExportRecordingsUseCase::new(two_page_history(), DeniedDownloader);
        let output = use_case
            .execute(input(true), ExportCallbacks::default())
            .await
            .unwrap();

        let ExportOutput::Downloaded(_, outcome) = output else {
            panic!("expected download output");
        };
        assert_eq!(outcome.attempted(), 2);
        assert_eq!(outcome.succeeded(), 0);
    }
}
