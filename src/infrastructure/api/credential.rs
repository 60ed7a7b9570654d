//! Credentials attached to PBX API requests

use std::fmt;

use reqwest::RequestBuilder;

/// How requests to the PBX API are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// REST API key and secret, sent as HTTP basic auth
    Basic { key: String, secret: String },
    /// Access token obtained from the SSO login
    Bearer(String),
}

impl Credential {
    pub fn basic(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::Basic {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Add the matching `Authorization` header to a request
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { key, secret } => request.basic_auth(key, Some(secret)),
            Self::Bearer(token) => request.bearer_auth(token),
        }
    }
}

// Secrets never end up in logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { key, .. } => f
                .debug_struct("Basic")
                .field("key", key)
                .field("secret", &"***")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"***").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secrets() {
        let basic = format!("{:?}", Credential::basic("key-1", "s3cret"));
        let bearer = format!("{:?}", Credential::bearer("tok3n"));

        assert!(basic.contains("key-1"));
        assert!(!basic.contains("s3cret"));
        assert!(!bearer.contains("tok3n"));
    }

    #[test]
    fn bearer_sets_authorization_header() {
        let client = reqwest::Client::new();
        let request = Credential::bearer("abc")
            .authorize(client.get("http://localhost/"))
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn basic_sets_authorization_header() {
        let client = reqwest::Client::new();
        let request = Credential::basic("user", "pass")
            .authorize(client.get("http://localhost/"))
            .build()
            .unwrap();

        let header = request
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(header.starts_with("Basic "));
    }
}
