//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod export;
pub mod fetch_calls;
pub mod ports;

// Re-export use cases
pub use export::{
    ExportCallbacks, ExportError, ExportInput, ExportOutput, ExportRecordingsUseCase,
    ExportReport, ExportStage,
};
pub use fetch_calls::{fetch_all_calls, FetchedCalls};
