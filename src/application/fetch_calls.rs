//! Sequential traversal of the paginated call history

use crate::domain::call::{CallFilter, CallRecord};
use crate::domain::error::RemoteError;

use super::ports::CallHistory;

/// Upper bound on pages requested in one run. A server that keeps
/// advertising `next` beyond this is treated as misbehaving.
pub const MAX_PAGES: u32 = 10_000;

/// Calls collected from every page of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedCalls {
    pub records: Vec<CallRecord>,
    pub pages: u32,
    /// Total page count, when the API advertised a `last` relation
    pub total_pages: Option<u32>,
}

/// Fetch page 1, then page N+1 for as long as the previous page advertised
/// a `next` relation. Pages are requested one after another and records
/// keep the order the API returned them in.
///
/// `on_page` is called after each page with (page, total_pages).
pub async fn fetch_all_calls<H, F>(
    history: &H,
    filter: &CallFilter,
    mut on_page: F,
) -> Result<FetchedCalls, RemoteError>
where
    H: CallHistory + ?Sized,
    F: FnMut(u32, Option<u32>),
{
    let mut fetched = FetchedCalls::default();
    let mut page = 1;

    loop {
        let result = history.fetch_page(filter, page).await?;
        fetched.pages = page;
        if result.total_pages.is_some() {
            fetched.total_pages = result.total_pages;
        }

        tracing::debug!(
            page,
            items = result.items.len(),
            total_pages = ?fetched.total_pages,
            has_next = result.has_next(),
            "fetched call history page"
        );
        on_page(page, fetched.total_pages);

        let has_next = result.has_next();
        fetched.records.extend(result.items);

        if !has_next {
            break;
        }
        if page >= MAX_PAGES {
            return Err(RemoteError::Decode(format!(
                "pagination did not terminate after {} pages",
                MAX_PAGES
            )));
        }
        page += 1;
    }

    Ok(fetched)
}
