//! Domain error types

use std::path::PathBuf;

use thiserror::Error;

/// Error when an unsupported extension override is given
#[derive(Debug, Clone, Error)]
#[error("Invalid extension: \"{input}\". Valid extensions are: mp3, wav")]
pub struct InvalidExtensionError {
    pub input: String,
}

/// Failure talking to the PBX API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Credentials rejected by the API (HTTP 401)")]
    Unauthorized,

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed API response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        if status == 401 {
            Self::Unauthorized
        } else {
            Self::Api {
                status,
                message: message.into(),
            }
        }
    }
}

/// Failure on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl StorageError {
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else {
            Self::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_unauthorized() {
        assert_eq!(RemoteError::from_status(401, "nope"), RemoteError::Unauthorized);
    }

    #[test]
    fn other_status_is_api_error() {
        let err = RemoteError::from_status(503, "busy");
        assert_eq!(
            err,
            RemoteError::Api {
                status: 503,
                message: "busy".into()
            }
        );
        assert_eq!(err.to_string(), "API returned HTTP 503: busy");
    }

    #[test]
    fn permission_denied_io_maps_to_permission_error() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = StorageError::from_io("/root/x", io);
        assert!(matches!(err, StorageError::PermissionDenied { .. }));
    }
}
