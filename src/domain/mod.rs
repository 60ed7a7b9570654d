//! Domain layer - Core business logic
//!
//! Contains value objects and domain errors.
//! This layer has no dependencies on external systems.

pub mod call;
pub mod config;
pub mod error;
pub mod export;

// Re-export common types
pub use call::{AudioExtension, CallFilter, CallPage, CallRecord};
pub use config::AppConfig;
pub use error::*;
pub use export::{DownloadTarget, RecordingSelection, RunOutcome};
