//! The fetch capability used by the resolver, the artifact locator and the self-updater.
//!
//! All network access goes through the [`Fetcher`] trait. Each call either succeeds or
//! fails as a unit with a [`FetchError`]; callers never see partial content and never
//! branch on *why* a fetch failed. Inside fallback chains a `FetchError` simply means
//! "this tier produced nothing, try the next one".
//!
//! The production implementation is [`http::HttpFetcher`]. Tests use the in-memory
//! `StubFetcher` from `test_utils`, which returns canned responses per URL and records
//! every call.
//!
//! The trait methods return boxed futures so the trait stays object safe and can be
//! shared as `Arc<dyn Fetcher>`.

pub mod http;

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncWrite;

pub use http::HttpFetcher;

/// A failed fetch. Opaque to callers beyond its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure: DNS, TLS, timeout, connection reset.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// URL requested
        url: String,
        /// Transport error message
        reason: String,
    },

    /// Non-success HTTP status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// URL requested
        url: String,
        /// Status code received
        status: u16,
    },

    /// The body could not be decoded as the requested type.
    #[error("unexpected response from {url}: {reason}")]
    InvalidBody {
        /// URL requested
        url: String,
        /// Decode error message
        reason: String,
    },

    /// Writing the streamed body to its sink failed.
    #[error("failed to write response from {url}: {reason}")]
    Write {
        /// URL requested
        url: String,
        /// I/O error message
        reason: String,
    },
}

/// Request headers, kept ordered so logs and test assertions are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    /// No headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a header.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// `Accept: application/json`, needed to get JSON out of the releases web UI.
    #[must_use]
    pub fn accept_json() -> Self {
        Self::new().with("Accept", "application/json")
    }

    /// Headers for GitHub API calls, with an optional bearer token.
    #[must_use]
    pub fn github_api(bearer_token: Option<&str>) -> Self {
        let headers = Self::new().with("Accept", "application/vnd.github+json");
        match bearer_token {
            Some(token) if !token.is_empty() => {
                headers.with("Authorization", format!("Bearer {token}"))
            }
            _ => headers,
        }
    }

    /// Header value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether no headers are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Boxed future returned by [`Fetcher`] methods.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Writable sink for streamed downloads.
pub type Sink<'a> = &'a mut (dyn AsyncWrite + Send + Unpin);

/// Network capability.
pub trait Fetcher: Send + Sync {
    /// Fetch and decode a JSON document.
    fn fetch_json<'a>(&'a self, url: &'a str, headers: &'a Headers)
    -> FetchFuture<'a, serde_json::Value>;

    /// Fetch a UTF-8 text document.
    fn fetch_text<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, String>;

    /// Stream a response body into `sink`, returning the number of bytes written.
    ///
    /// On failure the sink may have received part of the body.
    fn fetch_to_writer<'a>(
        &'a self,
        url: &'a str,
        headers: &'a Headers,
        sink: Sink<'a>,
    ) -> FetchFuture<'a, u64>;

    /// Check that `url` exists without downloading its body (HEAD semantics).
    fn probe<'a>(&'a self, url: &'a str, headers: &'a Headers) -> FetchFuture<'a, ()>;
}

/// Fetch a JSON document and deserialize it into `T`.
///
/// # Errors
///
/// Returns the fetch error, or [`FetchError::InvalidBody`] if the document does not have
/// the expected shape.
pub async fn fetch_typed<T: DeserializeOwned>(
    fetcher: &dyn Fetcher,
    url: &str,
    headers: &Headers,
) -> Result<T, FetchError> {
    let value = fetcher.fetch_json(url, headers).await?;
    serde_json::from_value(value).map_err(|e| FetchError::InvalidBody {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
