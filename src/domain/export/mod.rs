//! Export domain module: what to download and how it went

mod outcome;
mod selection;
mod target;

pub use outcome::{FailedDownload, RunOutcome};
pub use selection::{select_recordings, OverrideCollision, RecordingSelection};
pub use target::{sanitize_file_name, DownloadTarget, DEFAULT_OUTPUT_DIR};
