//! In-memory [`HttpClient`] for tests and offline use.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::effects::http::{HttpClient, HttpResponse, StreamResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for MockError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
enum Route {
    Respond {
        status: u16,
        body: Bytes,
        chunk_size: usize,
        content_length: bool,
        fail_after: Option<usize>,
    },
    Fail(String),
}

/// Serves canned responses keyed by exact URL and records every request.
///
/// Unknown URLs answer `404`.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `status` and `body`, streamed as a single chunk.
    pub fn respond(&self, url: impl Into<String>, status: u16, body: impl Into<Bytes>) -> &Self {
        let body = body.into();
        let chunk_size = body.len().max(1);
        self.insert(url, Route::Respond {
            status,
            body,
            chunk_size,
            content_length: true,
            fail_after: None,
        })
    }

    pub fn respond_json(&self, url: impl Into<String>, value: &serde_json::Value) -> &Self {
        self.respond(url, 200, value.to_string())
    }

    /// Answer `url` with a 200 whose body streams in `chunk_size` pieces.
    pub fn respond_chunked(
        &self,
        url: impl Into<String>,
        body: impl Into<Bytes>,
        chunk_size: usize,
    ) -> &Self {
        self.insert(url, Route::Respond {
            status: 200,
            body: body.into(),
            chunk_size: chunk_size.max(1),
            content_length: true,
            fail_after: None,
        })
    }

    /// Like [`respond_chunked`](Self::respond_chunked) without a Content-Length.
    pub fn respond_unsized(
        &self,
        url: impl Into<String>,
        body: impl Into<Bytes>,
        chunk_size: usize,
    ) -> &Self {
        self.insert(url, Route::Respond {
            status: 200,
            body: body.into(),
            chunk_size: chunk_size.max(1),
            content_length: false,
            fail_after: None,
        })
    }

    /// Stream `after_chunks` chunks of `body`, then fail the stream.
    pub fn fail_mid_stream(
        &self,
        url: impl Into<String>,
        body: impl Into<Bytes>,
        chunk_size: usize,
        after_chunks: usize,
    ) -> &Self {
        self.insert(url, Route::Respond {
            status: 200,
            body: body.into(),
            chunk_size: chunk_size.max(1),
            content_length: true,
            fail_after: Some(after_chunks),
        })
    }

    /// Fail requests to `url` before any response is produced.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) -> &Self {
        self.insert(url, Route::Fail(message.into()))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self, method: Method) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn insert(&self, url: impl Into<String>, route: Route) -> &Self {
        lock(&self.routes).insert(url.into(), route);
        self
    }

    fn record(&self, method: Method, url: &str, headers: &[(String, String)]) -> Option<Route> {
        lock(&self.requests).push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers.to_vec(),
        });
        lock(&self.routes).get(url).cloned()
    }
}

impl HttpClient for MockHttpClient {
    type Error = MockError;

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, Self::Error> {
        match self.record(Method::Get, url, headers) {
            Some(Route::Respond { status, body, .. }) => Ok(HttpResponse { status, body }),
            Some(Route::Fail(message)) => Err(MockError(message)),
            None => Ok(not_found()),
        }
    }

    async fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<StreamResponse<Self::Error>, Self::Error> {
        let route = match self.record(Method::Stream, url, headers) {
            Some(route) => route,
            None => {
                let response = not_found();
                return Ok(StreamResponse {
                    status: response.status,
                    content_length: Some(response.body.len() as u64),
                    body: Box::pin(futures_util::stream::iter(vec![Ok::<_, MockError>(response.body)])),
                });
            }
        };

        match route {
            Route::Fail(message) => Err(MockError(message)),
            Route::Respond {
                status,
                body,
                chunk_size,
                content_length,
                fail_after,
            } => {
                let len = body.len() as u64;
                let mut items: Vec<Result<Bytes, MockError>> = body
                    .chunks(chunk_size)
                    .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                    .collect();
                if let Some(after) = fail_after {
                    items.truncate(after);
                    items.push(Err(MockError("connection reset".to_string())));
                }

                Ok(StreamResponse {
                    status,
                    content_length: content_length.then_some(len),
                    body: Box::pin(futures_util::stream::iter(items)),
                })
            }
        }
    }
}

fn not_found() -> HttpResponse {
    HttpResponse {
        status: 404,
        body: Bytes::from_static(b"not found"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
