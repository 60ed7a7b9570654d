//! SSO login against the central API

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::domain::error::RemoteError;

/// Login errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Wrong username or password")]
    InvalidCredentials,

    #[error("User has no PBX assigned")]
    NoPbxAssigned,

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    services: Vec<UserService>,
}

#[derive(Debug, Deserialize)]
struct UserService {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    properties: Option<ServiceProperties>,
}

#[derive(Debug, Deserialize)]
struct ServiceProperties {
    #[serde(rename = "pbxId", default)]
    pbx_id: Option<serde_json::Value>,
}

/// Session obtained from a successful login
#[derive(Clone, PartialEq, Eq)]
pub struct SsoSession {
    pub access_token: String,
    pub pbx_id: String,
}

impl std::fmt::Debug for SsoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoSession")
            .field("access_token", &"***")
            .field("pbx_id", &self.pbx_id)
            .finish()
    }
}

/// Client for the central SSO API
pub struct SsoClient {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl SsoClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Log in and resolve the PBX the account belongs to
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SsoSession, AuthError> {
        let access_token = self.login(email, password).await?;
        let pbx_id = self.pbx_id(&access_token).await?;
        tracing::debug!(%pbx_id, "authenticated via SSO");
        Ok(SsoSession {
            access_token,
            pbx_id,
        })
    }

    /// Exchange email and password for an access token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .post(format!("{}/v1/sso/login", self.base_url))
            .timeout(self.timeout)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), body).into());
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(body.access_token)
    }

    /// Look up the id of the PBX service assigned to the user
    pub async fn pbx_id(&self, access_token: &str) -> Result<String, AuthError> {
        let response = self
            .client
            .get(format!("{}/v1/users/me", self.base_url))
            .timeout(self.timeout)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), body).into());
        }

        let profile: UserProfile = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Self::find_pbx_id(&profile).ok_or(AuthError::NoPbxAssigned)
    }

    fn find_pbx_id(profile: &UserProfile) -> Option<String> {
        let value = profile
            .services
            .iter()
            .find(|s| s.kind == "pbx")?
            .properties
            .as_ref()?
            .pbx_id
            .as_ref()?;

        match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
