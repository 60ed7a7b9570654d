//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::export::DEFAULT_OUTPUT_DIR;

/// Base URL of the PBX API used with SSO (email/password) credentials
pub const DEFAULT_API_URL: &str = "https://ipbxapi.voipex.io";

/// Base URL of the central API that issues SSO tokens
pub const DEFAULT_SSO_URL: &str = "https://restapi.ipex.cz";

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub sso_url: Option<String>,
    /// PBX host for API key authentication, e.g. `company.voipex.io`
    pub host: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub email: Option<String>,
    pub output_dir: Option<String>,
    pub page_size: Option<u32>,
    /// Also the longest a recording download may go without receiving data
    pub request_timeout_secs: Option<u64>,
    /// Cap on a whole recording download; unlimited when unset
    pub download_timeout_secs: Option<u64>,
    /// Use the `calls` and `records/{linkedid}/stream` routes of older PBXs
    pub legacy_api: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            sso_url: Some(DEFAULT_SSO_URL.to_string()),
            host: None,
            api_key: None,
            api_secret: None,
            email: None,
            output_dir: Some(DEFAULT_OUTPUT_DIR.to_string()),
            page_size: Some(DEFAULT_PAGE_SIZE),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            download_timeout_secs: None,
            legacy_api: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            sso_url: other.sso_url.or(self.sso_url),
            host: other.host.or(self.host),
            api_key: other.api_key.or(self.api_key),
            api_secret: other.api_secret.or(self.api_secret),
            email: other.email.or(self.email),
            output_dir: other.output_dir.or(self.output_dir),
            page_size: other.page_size.or(self.page_size),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            download_timeout_secs: other.download_timeout_secs.or(self.download_timeout_secs),
            legacy_api: other.legacy_api.or(self.legacy_api),
        }
    }

    pub fn api_url_or_default(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn sso_url_or_default(&self) -> &str {
        self.sso_url.as_deref().unwrap_or(DEFAULT_SSO_URL)
    }

    pub fn output_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR))
    }

    /// Page size, never zero
    pub fn page_size_or_default(&self) -> u32 {
        self.page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn request_timeout_or_default(&self) -> std::time::Duration {
        std::time::Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn download_timeout(&self) -> Option<std::time::Duration> {
        self.download_timeout_secs
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }

    pub fn legacy_api_or_default(&self) -> bool {
        self.legacy_api.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.api_url.as_deref(), Some(DEFAULT_API_URL));
        assert_eq!(config.sso_url.as_deref(), Some(DEFAULT_SSO_URL));
        assert_eq!(config.output_dir.as_deref(), Some("downloads"));
        assert_eq!(config.page_size, Some(100));
        assert!(config.api_key.is_none());
        assert!(config.email.is_none());
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.api_url.is_none());
        assert!(config.host.is_none());
        assert!(config.page_size.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            email: Some("base@example.com".to_string()),
            page_size: Some(50),
            output_dir: Some("base".to_string()),
            ..Default::default()
        };
        let other = AppConfig {
            email: Some("other@example.com".to_string()),
            page_size: None,
            output_dir: Some("other".to_string()),
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.email.as_deref(), Some("other@example.com"));
        assert_eq!(merged.page_size, Some(50));
        assert_eq!(merged.output_dir.as_deref(), Some("other"));
    }

    #[test]
    fn accessors_fall_back_to_defaults() {
        let config = AppConfig::empty();
        assert_eq!(config.api_url_or_default(), DEFAULT_API_URL);
        assert_eq!(config.output_dir_or_default(), PathBuf::from("downloads"));
        assert_eq!(config.page_size_or_default(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.request_timeout_or_default().as_secs(), 60);
        assert!(config.download_timeout().is_none());
        assert!(!config.legacy_api_or_default());
    }

    #[test]
    fn download_cap_is_off_unless_configured() {
        assert!(AppConfig::defaults().download_timeout().is_none());

        let capped = AppConfig::defaults().merge(AppConfig {
            download_timeout_secs: Some(900),
            ..Default::default()
        });
        assert_eq!(capped.download_timeout().map(|d| d.as_secs()), Some(900));
    }

    #[test]
    fn zero_page_size_uses_default() {
        let config = AppConfig {
            page_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config.page_size_or_default(), DEFAULT_PAGE_SIZE);
    }
}
