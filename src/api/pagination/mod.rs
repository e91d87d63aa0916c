//! Full-collection fetch over the backend's page-numbered list endpoints.
//!
//! List endpoints take `page` (from 1) and `page_size` query parameters and
//! report the overall item count in `pages.total`. [`fetch_all`] walks the
//! pages one at a time and concatenates them into a single collection.

#[cfg(test)]
mod tests;

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::client::ApiClient;
use super::envelope::Envelope;
use super::error::ApiError;

/// Page size used when listing a whole collection.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// The paging half of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageQuery {
    pub page: u64,
    pub page_size: u64,
}

impl PageQuery {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }
}

/// One page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Item count across all pages.
    pub total: u64,
}

impl<T> From<Envelope<Vec<T>>> for Page<T> {
    fn from(env: Envelope<Vec<T>>) -> Self {
        let total = env.total();
        Self {
            data: env.data.unwrap_or_default(),
            total,
        }
    }
}

/// Anything that can return a numbered page.
///
/// Production code uses [`ListEndpoint`]; tests provide mocks that count
/// calls or fail on a chosen page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    type Item;

    async fn fetch_page(&self, query: PageQuery) -> Result<Page<Self::Item>, ApiError>;
}

/// Fetch every page of `source` and return the items in page order.
///
/// The page count is fixed from the first response's `total`; later responses
/// are not re-checked (unlike recomputing it from every page), so a collection
/// that changes size mid-walk yields whatever those pages contain. Pages are
/// fetched strictly one after another. Any failing page fails the whole call
/// and the pages gathered so far are dropped.
pub async fn fetch_all<S: PageSource>(source: &S, page_size: u64) -> Result<Vec<S::Item>, ApiError> {
    if page_size == 0 {
        return Err(ApiError::InvalidPageSize);
    }

    let mut page = 1;
    let mut total_pages = None;
    let mut accumulated = Vec::new();

    loop {
        let result = source.fetch_page(PageQuery::new(page, page_size)).await?;
        let last = *total_pages.get_or_insert_with(|| result.total.div_ceil(page_size));
        accumulated.extend(result.data);

        if page >= last {
            break;
        }
        page += 1;
    }

    log::debug!(
        "Fetched {} items over {} page(s) (page_size {})",
        accumulated.len(),
        page,
        page_size
    );
    Ok(accumulated)
}

#[derive(Serialize)]
struct PagedQuery<'a, F> {
    #[serde(flatten)]
    filter: &'a F,
    #[serde(flatten)]
    page: PageQuery,
}

/// Filter for list endpoints that take none besides paging.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoFilter {}

/// A paginated GET endpoint together with its filter parameters.
///
/// `F` must serialize as a struct or map; its fields are sent next to `page`
/// and `page_size`.
pub struct ListEndpoint<'a, T, F> {
    client: &'a ApiClient,
    path: &'a str,
    filter: &'a F,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T, F> ListEndpoint<'a, T, F>
where
    T: DeserializeOwned,
    F: Serialize,
{
    pub fn new(client: &'a ApiClient, path: &'a str, filter: &'a F) -> Self {
        Self {
            client,
            path,
            filter,
            _item: PhantomData,
        }
    }

    /// Fetch a single page, keeping the full envelope (with `pages`).
    pub async fn page(&self, query: PageQuery) -> Result<Envelope<Vec<T>>, ApiError> {
        let params = PagedQuery {
            filter: self.filter,
            page: query,
        };
        self.client.get(self.path, &params).await
    }

    /// Fetch the whole collection.
    pub async fn all(&self, page_size: u64) -> Result<Vec<T>, ApiError> {
        fetch_all(self, page_size).await
    }
}

impl<T, F> PageSource for ListEndpoint<'_, T, F>
where
    T: DeserializeOwned,
    F: Serialize,
{
    type Item = T;

    async fn fetch_page(&self, query: PageQuery) -> Result<Page<T>, ApiError> {
        self.page(query).await.map(Page::from)
    }
}
