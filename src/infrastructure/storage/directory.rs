//! Destination directory preparation

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use crate::domain::error::StorageError;

/// Make sure `path` exists as a writable directory.
///
/// An existing usable directory is left alone. Otherwise the directory and
/// all missing parents are created; another task creating it at the same
/// time is not an error.
pub async fn ensure_dir(path: &Path) -> Result<(), StorageError> {
    if path.as_os_str().is_empty() || is_writable_dir(path).await {
        return Ok(());
    }

    match fs::create_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => {}
        Err(e) => return Err(StorageError::from_io(path, e)),
    }

    if is_writable_dir(path).await {
        Ok(())
    } else if path.is_dir() {
        Err(StorageError::PermissionDenied {
            path: path.to_path_buf(),
        })
    } else {
        Err(StorageError::Io {
            path: path.to_path_buf(),
            message: "exists but is not a directory".to_string(),
        })
    }
}

/// Directory the current user may list and create files in
async fn is_writable_dir(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_dir() && has_access(path, &meta),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_access(path: &Path, _meta: &std::fs::Metadata) -> bool {
    use nix::unistd::{access, AccessFlags};

    access(path, AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn has_access(_path: &Path, meta: &std::fs::Metadata) -> bool {
    !meta.permissions().readonly()
}
