//! Call history port interface

use async_trait::async_trait;

use crate::domain::call::{CallFilter, CallPage};
use crate::domain::error::RemoteError;

/// Port for reading call history one page at a time
#[async_trait]
pub trait CallHistory: Send + Sync {
    /// Fetch a single page of calls matching the filter.
    ///
    /// # Arguments
    /// * `filter` - Date range and queue filter
    /// * `page` - 1-based page number
    ///
    /// # Errors
    /// `RemoteError::Unauthorized` on HTTP 401, `RemoteError::Api` for
    /// other non-2xx statuses and `RemoteError::Network` on transport failure.
    async fn fetch_page(&self, filter: &CallFilter, page: u32) -> Result<CallPage, RemoteError>;
}
