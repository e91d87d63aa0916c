//! Unit tests for the full-collection paginator.
//!
//! Uses mock page sources backed by an in-memory collection.

#[cfg(test)]
mod paginator_tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::client::{ApiClient, DEFAULT_TIMEOUT};
    use crate::api::error::ApiError;
    use crate::api::pagination::{
        fetch_all, ListEndpoint, NoFilter, Page, PageQuery, PageSource, DEFAULT_PAGE_SIZE,
    };
    use crate::notify::RecordingSink;
    use crate::session::MemorySessionStore;

    // ── Mock Page Sources ────────────────────────────────────────────────

    /// Serves `0..total` in pages and records every request.
    struct VecSource {
        total: u64,
        calls: AtomicU32,
        requested: Mutex<Vec<PageQuery>>,
    }

    impl VecSource {
        fn new(total: u64) -> Self {
            Self {
                total,
                calls: AtomicU32::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PageSource for VecSource {
        type Item = u64;

        async fn fetch_page(&self, query: PageQuery) -> Result<Page<u64>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(query);

            let start = (query.page - 1) * query.page_size;
            let end = (start + query.page_size).min(self.total);
            Ok(Page {
                data: (start.min(end)..end).collect(),
                total: self.total,
            })
        }
    }

    /// Fails with an application error on one page.
    struct FailingSource {
        inner: VecSource,
        fail_on: u64,
    }

    impl PageSource for FailingSource {
        type Item = u64;

        async fn fetch_page(&self, query: PageQuery) -> Result<Page<u64>, ApiError> {
            if query.page == self.fail_on {
                self.inner.calls.fetch_add(1, Ordering::SeqCst);
                return Err(ApiError::Application {
                    request_id: "page-fail".to_string(),
                    message: None,
                });
            }
            self.inner.fetch_page(query).await
        }
    }

    /// Reports a different `total` on each call.
    struct ShrinkingSource {
        totals: Vec<u64>,
        calls: AtomicU32,
    }

    impl PageSource for ShrinkingSource {
        type Item = u64;

        async fn fetch_page(&self, query: PageQuery) -> Result<Page<u64>, ApiError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            Ok(Page {
                data: vec![query.page],
                total: self.totals[n.min(self.totals.len() - 1)],
            })
        }
    }

    // ── Tests ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_call_count_and_length_across_totals() {
        let page_size = 10;
        for total in [0, 1, page_size, page_size + 1, 10 * page_size] {
            let source = VecSource::new(total);
            let items = fetch_all(&source, page_size).await.unwrap();

            let expected_calls = total.div_ceil(page_size).max(1);
            assert_eq!(source.calls() as u64, expected_calls, "total={}", total);
            assert_eq!(items.len() as u64, total, "total={}", total);
            assert_eq!(items, (0..total).collect::<Vec<_>>(), "total={}", total);
        }
    }

    #[tokio::test]
    async fn test_empty_collection_single_call() {
        let source = VecSource::new(0);
        let items = fetch_all(&source, DEFAULT_PAGE_SIZE).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_page_size_constant_and_pages_sequential() {
        let source = VecSource::new(35);
        let _ = fetch_all(&source, 10).await.unwrap();

        let requested = source.requested.lock().unwrap().clone();
        assert_eq!(
            requested,
            vec![
                PageQuery::new(1, 10),
                PageQuery::new(2, 10),
                PageQuery::new(3, 10),
                PageQuery::new(4, 10),
            ]
        );
    }

    #[tokio::test]
    async fn test_150_items_two_calls() {
        let source = VecSource::new(150);
        let items = fetch_all(&source, 100).await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(items.len(), 150);
        assert_eq!(items.first(), Some(&0));
        assert_eq!(items.last(), Some(&149));
    }

    #[tokio::test]
    async fn test_failing_page_discards_partial_results() {
        let source = FailingSource {
            inner: VecSource::new(250),
            fail_on: 2,
        };
        let result = fetch_all(&source, 100).await;

        assert!(matches!(result, Err(ApiError::Application { .. })));
        // Page 3 is never requested once page 2 fails.
        assert_eq!(source.inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_first_page() {
        let source = FailingSource {
            inner: VecSource::new(5),
            fail_on: 1,
        };
        assert!(fetch_all(&source, 100).await.is_err());
        assert_eq!(source.inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_page_size_rejected_without_requests() {
        let source = VecSource::new(10);
        let result = fetch_all(&source, 0).await;
        assert!(matches!(result, Err(ApiError::InvalidPageSize)));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_page_count_fixed_by_first_response() {
        // First response says 3 pages; later responses claim 1 and 10.
        let source = ShrinkingSource {
            totals: vec![30, 10, 100],
            calls: AtomicU32::new(0),
        };
        let items = fetch_all(&source, 10).await.unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_list_endpoint_walks_server_pages() {
        let server = MockServer::start().await;
        let items: Vec<u64> = (1..=150).collect();

        Mock::given(method("GET"))
            .and(path("/api/v1/apis"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": &items[..100],
                "pages": {"page": 1, "page_size": 100, "total": 150},
                "request_id": "p1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/apis"))
            .and(query_param("page", "2"))
            .and(query_param("page_size", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": &items[100..],
                "pages": {"page": 2, "page_size": 100, "total": 150},
                "request_id": "p2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            &server.uri(),
            DEFAULT_TIMEOUT,
            std::sync::Arc::new(MemorySessionStore::default()),
            std::sync::Arc::new(RecordingSink::default()),
        );
        let endpoint: ListEndpoint<'_, u64, NoFilter> =
            ListEndpoint::new(&client, "/api/v1/apis", &NoFilter {});
        let all = endpoint.all(100).await.unwrap();
        assert_eq!(all, items);
    }

    #[tokio::test]
    async fn test_list_endpoint_failure_reported_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/roles"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": [1, 2],
                "pages": {"total": 4},
                "request_id": "p1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/roles"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": false,
                "request_id": "p2-broken"
            })))
            .mount(&server)
            .await;

        let sink = std::sync::Arc::new(RecordingSink::default());
        let client = ApiClient::new(
            &server.uri(),
            DEFAULT_TIMEOUT,
            std::sync::Arc::new(MemorySessionStore::default()),
            sink.clone(),
        );
        let endpoint: ListEndpoint<'_, u64, NoFilter> =
            ListEndpoint::new(&client, "/api/v1/roles", &NoFilter {});
        let result = endpoint.all(2).await;

        assert!(result.is_err());
        assert_eq!(sink.messages(), vec!["request_id: p2-broken".to_string()]);
    }
}
