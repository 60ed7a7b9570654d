//! PBX REST API client adapter

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::CallHistory;
use crate::domain::call::{CallFilter, CallPage, CallRecord};
use crate::domain::config::{DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::domain::error::RemoteError;

use super::credential::Credential;

/// Endpoint layout of a PBX API, relative to its base URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiRoutes {
    /// `reports/calls` and `recordings/{reference}`
    #[default]
    Reports,
    /// `calls` and `records/{linkedid}/stream`, served by older PBX versions
    Legacy,
}

impl ApiRoutes {
    fn calls_path(self) -> &'static str {
        match self {
            Self::Reports => "reports/calls",
            Self::Legacy => "calls",
        }
    }
}

// Response types for the call-history endpoint

/// The endpoint answers either with a paginated envelope or, on older
/// deployments, with a bare array of calls.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CallListResponse {
    Paged {
        #[serde(default)]
        items: Vec<CallRecord>,
        #[serde(default)]
        links: Vec<PageLink>,
    },
    Bare(Vec<CallRecord>),
}

#[derive(Debug, Deserialize)]
struct PageLink {
    rel: String,
    #[serde(default)]
    href: Option<String>,
}

impl CallListResponse {
    fn into_page(self) -> CallPage {
        match self {
            Self::Bare(items) => CallPage::single(items),
            Self::Paged { items, links } => {
                let find = |rel: &str| links.iter().find(|l| l.rel.eq_ignore_ascii_case(rel));
                let next_link = find("next").map(|l| l.href.clone().unwrap_or_default());
                let total_pages = find("last")
                    .and_then(|l| l.href.as_deref())
                    .and_then(page_from_href);
                CallPage {
                    items,
                    next_link,
                    total_pages,
                }
            }
        }
    }
}

/// Read the `page` query parameter out of a link target
fn page_from_href(href: &str) -> Option<u32> {
    let (_, query) = href.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "page")
        .and_then(|(_, value)| value.parse().ok())
}

/// PBX API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PbxApiClient {
    base_url: String,
    credential: Credential,
    pbx_id: Option<String>,
    page_size: u32,
    routes: ApiRoutes,
    request_timeout: Duration,
    download_timeout: Option<Duration>,
    client: reqwest::Client,
}

impl PbxApiClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credential,
            pbx_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            routes: ApiRoutes::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            download_timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Address recordings of a specific PBX (SSO accounts)
    pub fn with_pbx_id(mut self, pbx_id: impl Into<String>) -> Self {
        self.pbx_id = Some(pbx_id.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_routes(mut self, routes: ApiRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// `request` bounds each call-list request and each wait for recording
    /// data. `download`, when set, caps a whole recording transfer.
    pub fn with_timeouts(mut self, request: Duration, download: Option<Duration>) -> Self {
        self.request_timeout = request;
        self.download_timeout = download;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Longest a recording download may wait for its next chunk
    pub fn idle_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Build the call-history URL
    fn calls_url(&self) -> String {
        format!("{}/{}", self.base_url, self.routes.calls_path())
    }

    /// Build the recording stream URL. The reference is encoded as a single
    /// path segment, slashes included. Legacy routes address the recording
    /// by the call's linked id and fall back to the reference without one.
    pub fn recording_url(&self, reference: &str, linked_id: Option<&str>) -> String {
        if let (ApiRoutes::Legacy, Some(linked_id)) = (self.routes, linked_id) {
            return format!(
                "{}/records/{}/stream",
                self.base_url,
                urlencoding::encode(linked_id)
            );
        }

        let mut url = format!(
            "{}/recordings/{}",
            self.base_url,
            urlencoding::encode(reference)
        );
        if let Some(ref pbx_id) = self.pbx_id {
            url.push_str("/ipbx/");
            url.push_str(&urlencoding::encode(pbx_id));
        }
        url
    }

    /// Start streaming a recording. The body has not been read yet when
    /// this returns; non-2xx statuses are already turned into errors.
    pub async fn open_recording(
        &self,
        reference: &str,
        linked_id: Option<&str>,
    ) -> Result<reqwest::Response, RemoteError> {
        let mut request = self.client.get(self.recording_url(reference, linked_id));
        if let Some(total) = self.download_timeout {
            request = request.timeout(total);
        }

        let idle = self.idle_timeout();
        let response = tokio::time::timeout(idle, self.credential.authorize(request).send())
            .await
            .map_err(|_| RemoteError::Network(format!("no response within {:?}", idle)))?
            .map_err(network_error)?;

        ensure_success(response).await
    }
}

#[async_trait]
impl CallHistory for PbxApiClient {
    async fn fetch_page(&self, filter: &CallFilter, page: u32) -> Result<CallPage, RemoteError> {
        let page = page.to_string();
        let page_size = self.page_size.to_string();

        let mut request = self
            .client
            .get(self.calls_url())
            .timeout(self.request_timeout)
            .query(&[
                ("startTime", filter.start_time.as_str()),
                ("endTime", filter.end_time.as_str()),
                ("page", page.as_str()),
                ("pageSize", page_size.as_str()),
            ]);
        if let Some(queues) = filter.queues_query() {
            request = request.query(&[("queues", queues)]);
        }

        let response = self
            .credential
            .authorize(request)
            .send()
            .await
            .map_err(network_error)?;
        let response = ensure_success(response).await?;

        let body: CallListResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        Ok(body.into_page())
    }
}

fn network_error(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Network(format!("request timed out: {}", e))
    } else {
        RemoteError::Network(e.to_string())
    }
}

/// Turn a non-2xx response into an error carrying the body text
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.trim().to_string()
    };
    Err(RemoteError::from_status(status.as_u16(), message))
}
