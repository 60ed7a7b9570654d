//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod call_history;
pub mod config;
pub mod downloader;

// Re-export common types
pub use call_history::CallHistory;
pub use config::ConfigStore;
pub use downloader::{DownloadError, RecordingDownloader};
