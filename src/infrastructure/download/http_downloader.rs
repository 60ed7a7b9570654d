//! Streaming recording downloader

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::application::ports::{DownloadError, RecordingDownloader};
use crate::domain::error::{RemoteError, StorageError};
use crate::domain::export::DownloadTarget;
use crate::infrastructure::api::PbxApiClient;
use crate::infrastructure::storage::ensure_dir;

/// Downloads recordings from the PBX API straight to disk.
///
/// The body is written chunk by chunk into a `.part` file next to the
/// destination, which is renamed into place once the whole body arrived.
/// A recording already on disk is only replaced by a complete one.
pub struct HttpRecordingDownloader {
    api: PbxApiClient,
}

impl HttpRecordingDownloader {
    pub fn new(api: PbxApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RecordingDownloader for HttpRecordingDownloader {
    async fn download(&self, target: &DownloadTarget) -> Result<u64, DownloadError> {
        let mut response = self
            .api
            .open_recording(target.reference(), target.linked_id())
            .await?;
        let destination = target.destination();

        if let Some(parent) = destination.parent() {
            ensure_dir(parent).await?;
        }

        let partial = partial_path(destination);
        let mut file = File::create(&partial)
            .await
            .map_err(|e| StorageError::from_io(&partial, e))?;

        let expected = response.content_length();
        let idle = self.api.idle_timeout();
        let copied = copy_body(&mut response, &mut file, &partial, expected, idle).await;
        drop(file);

        let result: Result<u64, DownloadError> = match copied {
            Ok(written) => fs::rename(&partial, destination)
                .await
                .map(|_| written)
                .map_err(|e| StorageError::from_io(destination, e).into()),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = fs::remove_file(&partial).await {
                tracing::debug!(
                    partial = %partial.display(),
                    error = %e,
                    "failed to remove partial download"
                );
            }
        }

        result
    }
}

/// Sibling of `destination` the body is streamed into
fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// Write the response body into `file` and flush it.
/// Returns the number of bytes written. Fails when no chunk arrives
/// within `idle` or the body is shorter than `expected`.
async fn copy_body(
    response: &mut reqwest::Response,
    file: &mut File,
    path: &Path,
    expected: Option<u64>,
    idle: Duration,
) -> Result<u64, DownloadError> {
    let mut written: u64 = 0;

    loop {
        let chunk = tokio::time::timeout(idle, response.chunk())
            .await
            .map_err(|_| {
                RemoteError::Network(format!(
                    "download stalled: no data for {:?} after {} bytes",
                    idle, written
                ))
            })?
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        let Some(chunk) = chunk else {
            break;
        };

        file.write_all(&chunk)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| StorageError::from_io(path, e))?;

    if let Some(expected) = expected {
        if written != expected {
            return Err(RemoteError::Network(format!(
                "connection closed after {} of {} bytes",
                written, expected
            ))
            .into());
        }
    }

    Ok(written)
}
