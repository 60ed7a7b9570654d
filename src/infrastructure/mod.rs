//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the PBX REST API, the SSO service and the filesystem.

pub mod api;
pub mod auth;
pub mod config;
pub mod download;
pub mod storage;

// Re-export adapters
pub use api::{ApiRoutes, Credential, PbxApiClient};
pub use auth::{AuthError, SsoClient, SsoSession};
pub use config::XdgConfigStore;
pub use download::HttpRecordingDownloader;
pub use storage::ensure_dir;
