//! HTTP client with session token injection and uniform response classification.
//!
//! Every request carries the stored session token in the `token` header (when a
//! session exists). A response counts as a success only if it is HTTP 200 and
//! its envelope `status` is truthy; every other outcome is reported once to the
//! [`FailureSink`] and returned as an [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::envelope::{is_truthy, request_id_of, Envelope};
use super::error::ApiError;
use crate::notify::FailureSink;
use crate::session::SessionStore;

/// Header carrying the session JWT.
pub const TOKEN_HEADER: &str = "token";

/// Request ceiling used by the reference deployment.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Empty query string for calls that take none.
pub const NO_QUERY: &[(&str, &str)] = &[];

/// HTTP client wrapper for the DNS platform API.
///
/// Holds the base URL plus the injected session store and failure sink. The
/// session is re-read for every request, so a login in another process is
/// picked up by the next call without affecting calls already in flight.
pub struct ApiClient {
    client: Client,
    base_url: String,
    sessions: Arc<dyn SessionStore>,
    sink: Arc<dyn FailureSink>,
}

impl ApiClient {
    /// Create a new API client with the given base URL and per-request timeout.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        sessions: Arc<dyn SessionStore>,
        sink: Arc<dyn FailureSink>,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sessions,
            sink,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with `query` serialized into the query string.
    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.dispatch(Method::GET, path, builder).await
    }

    /// POST a JSON body to `path`.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.dispatch(Method::POST, path, builder).await
    }

    /// PUT a JSON body to `path`.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).json(body);
        self.dispatch(Method::PUT, path, builder).await
    }

    /// DELETE `path` with `query` serialized into the query string.
    pub async fn delete<T, Q>(&self, path: &str, query: &Q) -> Result<Envelope<T>, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::DELETE, path).query(query);
        self.dispatch(Method::DELETE, path, builder).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.authorize(self.client.request(method, url))
    }

    /// Attach the stored token, if any. A missing or unreadable session is
    /// not an error here; the server decides what an anonymous caller may do.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.sessions.load() {
            Ok(Some(session)) => builder.header(TOKEN_HEADER, session.token.as_str()),
            Ok(None) => builder,
            Err(e) => {
                log::warn!("Could not read stored session, sending unauthenticated: {}", e);
                builder
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        log::debug!("{} {}", method, path);
        let result = self.execute(path, builder).await;
        if let Err(ref e) = result {
            log::warn!("{} {} failed: {}", method, path, e.detail());
            self.sink.report(&e.to_string());
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let transport = |source| ApiError::Transport {
            path: path.to_string(),
            source,
        };
        let decode = |source| ApiError::Decode {
            path: path.to_string(),
            source,
        };

        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(transport)?;

        if status != StatusCode::OK {
            let request_id = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(request_id_of);
            return Err(ApiError::Http {
                path: path.to_string(),
                status: status.as_u16(),
                request_id,
            });
        }

        let body: Value = serde_json::from_slice(&bytes).map_err(decode)?;
        if !body.get("status").map(is_truthy).unwrap_or(false) {
            return Err(ApiError::Application {
                request_id: request_id_of(&body).unwrap_or_default(),
                message: body
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }

        Envelope::from_value(body).map_err(decode)
    }
}
