//! In-memory [`Fetcher`] for tests.

use crate::fetch::{FetchError, FetchFuture, Fetcher, Headers, Sink};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

/// Which [`Fetcher`] method was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// `fetch_json`
    Json,
    /// `fetch_text`
    Text,
    /// `fetch_to_writer`
    Download,
    /// `probe`
    Probe,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    /// Method called
    pub kind: FetchKind,
    /// URL requested
    pub url: String,
    /// Headers sent
    pub headers: Headers,
}

#[derive(Debug, Clone)]
enum Canned {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
    Partial(Vec<u8>),
}

/// A [`Fetcher`] answering from canned responses keyed by exact URL.
///
/// Unknown URLs fail with HTTP 404, as does a probe of a URL that was neither
/// registered with [`with_probe`](Self::with_probe) nor given a successful response.
#[derive(Debug, Default)]
pub struct StubFetcher {
    routes: HashMap<String, Canned>,
    failures: HashSet<String>,
    probes: HashSet<String>,
    calls: Mutex<Vec<FetchCall>>,
}

impl StubFetcher {
    /// A stub with no routes: every call fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a JSON document.
    #[must_use]
    pub fn with_json(mut self, url: impl Into<String>, value: serde_json::Value) -> Self {
        self.routes.insert(url.into(), Canned::Json(value));
        self
    }

    /// Answer `url` with text.
    #[must_use]
    pub fn with_text(mut self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.routes.insert(url.into(), Canned::Text(text.into()));
        self
    }

    /// Answer `url` with raw bytes.
    #[must_use]
    pub fn with_bytes(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.into(), Canned::Bytes(bytes.into()));
        self
    }

    /// Stream `bytes` for `url`, then fail as if the connection dropped.
    #[must_use]
    pub fn with_partial_download(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.into(), Canned::Partial(bytes.into()));
        self
    }

    /// Fail every request to `url` with a transport error.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>) -> Self {
        self.failures.insert(url.into());
        self
    }

    /// Make probes of `url` succeed.
    #[must_use]
    pub fn with_probe(mut self, url: impl Into<String>) -> Self {
        self.probes.insert(url.into());
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.url).collect()
    }

    /// URLs requested with the given method, in order.
    #[must_use]
    pub fn urls_of(&self, kind: FetchKind) -> Vec<String> {
        self.calls().into_iter().filter(|call| call.kind == kind).map(|call| call.url).collect()
    }

    /// Whether any call's URL starts with `prefix`.
    #[must_use]
    pub fn was_called_with_prefix(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.url.starts_with(prefix))
    }

    fn record(&self, kind: FetchKind, url: &str, headers: &Headers) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(FetchCall {
            kind,
            url: url.to_string(),
            headers: headers.clone(),
        });
    }

    fn lookup(&self, url: &str) -> Result<&Canned, FetchError> {
        if self.failures.contains(url) {
            return Err(FetchError::Request {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        self.routes.get(url).ok_or_else(|| not_found(url))
    }
}

fn not_found(url: &str) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 404,
    }
}

fn invalid_body(url: &str, reason: impl ToString) -> FetchError {
    FetchError::InvalidBody {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

impl Fetcher for StubFetcher {
    fn fetch_json<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
    ) -> FetchFuture<'a, serde_json::Value> {
        self.record(FetchKind::Json, url, headers);
        let result = self.lookup(url).and_then(|canned| match canned {
            Canned::Json(value) => Ok(value.clone()),
            Canned::Text(text) => serde_json::from_str(text).map_err(|e| invalid_body(url, e)),
            Canned::Bytes(_) | Canned::Partial(_) => Err(invalid_body(url, "not a JSON document")),
        });
        Box::pin(async move { result })
    }

    fn fetch_text<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, String> {
        self.record(FetchKind::Text, url, headers);
        let result = self.lookup(url).and_then(|canned| match canned {
            Canned::Text(text) => Ok(text.clone()),
            Canned::Json(value) => Ok(value.to_string()),
            Canned::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|e| invalid_body(url, e)),
            Canned::Partial(_) => Err(invalid_body(url, "truncated body")),
        });
        Box::pin(async move { result })
    }

    fn fetch_to_writer<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
        sink: Sink<'a>,
    ) -> FetchFuture<'a, u64> {
        self.record(FetchKind::Download, url, headers);
        let canned = self.lookup(url).cloned();
        Box::pin(async move {
            let write_error = |e: std::io::Error| FetchError::Write {
                url: url.to_string(),
                reason: e.to_string(),
            };
            let (bytes, truncated) = match canned? {
                Canned::Bytes(bytes) => (bytes, false),
                Canned::Text(text) => (text.into_bytes(), false),
                Canned::Json(value) => (value.to_string().into_bytes(), false),
                Canned::Partial(bytes) => (bytes, true),
            };
            sink.write_all(&bytes).await.map_err(write_error)?;
            sink.flush().await.map_err(write_error)?;
            if truncated {
                return Err(FetchError::Request {
                    url: url.to_string(),
                    reason: "connection reset mid-body".to_string(),
                });
            }
            Ok(bytes.len() as u64)
        })
    }

    fn probe<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, ()> {
        self.record(FetchKind::Probe, url, headers);
        let result = if self.probes.contains(url) {
            Ok(())
        } else {
            self.lookup(url).map(|_| ())
        };
        Box::pin(async move { result })
    }
}
