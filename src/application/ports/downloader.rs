//! Recording download port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::{RemoteError, StorageError};
use crate::domain::export::DownloadTarget;

/// Download errors. Each one only affects the target it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Port for fetching one recording to local storage
#[async_trait]
pub trait RecordingDownloader: Send + Sync {
    /// Stream the recording to `target.destination()`.
    ///
    /// Resolves once the file has been fully written and flushed.
    ///
    /// # Returns
    /// Number of bytes written
    async fn download(&self, target: &DownloadTarget) -> Result<u64, DownloadError>;
}
